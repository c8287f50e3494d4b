//! Module partitioning work across a worker pool and merging results in input
//! order, with an advisory progress-reporting sink (spec.md §4.6, §5).
//!
//! The original design used a process-wide worker pool, progress queue, and
//! manager (spec.md §9, "Shared mutable state"). Here those are bundled into
//! one explicit [`Runtime`] value: construct it once at program start, pass it
//! into [`Runtime::dispatch`], and let it drop at program end.

use crate::error::{Error, Result};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::mpsc;
use std::thread;

/// Minimum chunk size handed to one worker.
const MIN_CHUNK: usize = 32;
/// Maximum chunk size handed to one worker.
const MAX_CHUNK: usize = 10_000;

/// One progress update from a worker: how far it has gotten through its chunk.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    /// Index of the worker chunk that produced this event.
    pub worker_id: usize,
    /// Items completed so far within this worker's chunk.
    pub completed: usize,
    /// Total items assigned to this worker's chunk.
    pub total: usize,
}

/// A rendering sink for aggregated progress. Advisory only: a sink that is slow
/// or drops events never blocks or corrupts a dispatch.
pub trait ProgressSink: Send + Sync {
    /// Called by the aggregator thread with one summary line per update batch.
    fn on_update(&self, line: &str);
}

/// A sink that discards every update; used for serial dispatch and tests.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_update(&self, _line: &str) {}
}

/// Handed to a worker task so it can report its own progress through a chunk.
/// Reports at roughly one update per 0.1% of the chunk or per 100 items,
/// whichever is larger, matching spec.md §4.6.
pub struct ProgressReporter {
    worker_id: usize,
    total: usize,
    tx: Option<mpsc::Sender<ProgressEvent>>,
    next_report_at: usize,
    step: usize,
}

impl ProgressReporter {
    fn new(worker_id: usize, total: usize, tx: Option<mpsc::Sender<ProgressEvent>>) -> Self {
        let step = (total / 1000).max(100);
        Self {
            worker_id,
            total,
            tx,
            next_report_at: step,
            step,
        }
    }

    /// Reports that `completed` items of this worker's chunk are done.
    pub fn report(&mut self, completed: usize) {
        if completed < self.next_report_at && completed < self.total {
            return;
        }
        self.next_report_at = self.next_report_at.saturating_add(self.step);
        if let Some(tx) = &self.tx {
            let _ = tx.send(ProgressEvent {
                worker_id: self.worker_id,
                completed,
                total: self.total,
            });
        }
    }
}

fn chunk_size(n_items: usize, workers: usize) -> usize {
    let per_core = n_items.div_ceil(workers.max(1));
    per_core.clamp(MIN_CHUNK, MAX_CHUNK)
}

/// Owns the worker pool and the progress aggregator used by every tier
/// dispatch. Construct once per process; all dispatch calls go through it.
pub struct Runtime {
    pool: Option<ThreadPool>,
}

impl Runtime {
    /// Builds a runtime. When `parallel` is `false`, [`Runtime::dispatch`] runs
    /// the task once, serially, on the calling thread. When `true`, a rayon
    /// thread pool sized to the hardware's parallelism backs every dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerFailure`] if the underlying thread pool fails to
    /// initialize.
    pub fn new(parallel: bool) -> Result<Self> {
        if !parallel {
            return Ok(Self { pool: None });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .build()
            .map_err(|e| Error::WorkerFailure(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Partitions `items` into chunks, runs `task` over each chunk (in
    /// parallel if this runtime was built with `parallel=true`), and
    /// concatenates the per-chunk results. The concatenation order is
    /// deterministic (worker index ascending) but callers must not rely on it
    /// corresponding to input order across chunk boundaries beyond that.
    ///
    /// # Errors
    ///
    /// Propagates the first worker failure; no partial results are returned.
    pub fn dispatch<T, R, F>(
        &self,
        items: Vec<T>,
        task: F,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<R>>
    where
        T: Send + Sync,
        R: Send,
        F: Fn(&[T], &mut ProgressReporter) -> Result<Vec<R>> + Sync,
    {
        let Some(pool) = &self.pool else {
            let mut reporter = ProgressReporter::new(0, items.len(), None);
            return task(&items, &mut reporter);
        };

        let workers = pool.current_num_threads();
        let chunk = chunk_size(items.len(), workers);
        let chunks: Vec<&[T]> = items.chunks(chunk.max(1)).collect();
        let n_chunks = chunks.len();

        let (tx, rx) = mpsc::channel::<ProgressEvent>();
        // mpsc::Sender isn't Sync, so each worker gets its own clone up front
        // rather than sharing one Sender by reference across the pool.
        let senders: Vec<_> = (0..n_chunks).map(|_| tx.clone()).collect();
        drop(tx);

        let results: Result<Vec<Vec<R>>> = thread::scope(|scope| {
            let aggregator = scope.spawn(move || aggregate_loop(rx, n_chunks, sink));

            let results = pool.install(|| {
                chunks
                    .into_par_iter()
                    .zip(senders.into_par_iter())
                    .enumerate()
                    .map(|(worker_id, (chunk_items, tx))| {
                        let mut reporter =
                            ProgressReporter::new(worker_id, chunk_items.len(), Some(tx));
                        let out = task(chunk_items, &mut reporter)?;
                        reporter.report(chunk_items.len());
                        Ok(out)
                    })
                    .collect()
            });
            let _ = aggregator.join();
            results
        });

        Ok(results?.into_iter().flatten().collect())
    }
}

/// Runs on its own thread for the duration of one dispatch: accumulates each
/// worker's latest `(completed, total)` and renders one combined summary line
/// per event, until every worker has reported completion.
fn aggregate_loop(rx: mpsc::Receiver<ProgressEvent>, expected_workers: usize, sink: &dyn ProgressSink) {
    let mut progress = vec![(0usize, 0usize); expected_workers];
    let mut finished = vec![false; expected_workers];
    for event in rx {
        if event.worker_id >= progress.len() {
            continue;
        }
        progress[event.worker_id] = (event.completed, event.total);
        if event.completed >= event.total {
            finished[event.worker_id] = true;
        }
        let line = progress
            .iter()
            .enumerate()
            .map(|(i, (done, total))| format!("w{i}: {done}/{total}"))
            .collect::<Vec<_>>()
            .join("  ");
        sink.on_update(&line);
        if finished.iter().all(|&f| f) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_is_clamped() {
        assert_eq!(chunk_size(10, 8), MIN_CHUNK);
        assert_eq!(chunk_size(1_000_000, 1), MAX_CHUNK);
    }

    #[test]
    fn serial_dispatch_runs_task_once() {
        let rt = Runtime::new(false).unwrap();
        let items = vec![1, 2, 3, 4];
        let out = rt
            .dispatch(
                items,
                |chunk: &[i32], _p| Ok(chunk.iter().map(|x| x * 2).collect::<Vec<_>>()),
                &NullSink,
            )
            .unwrap();
        assert_eq!(out, vec![2, 4, 6, 8]);
    }

    #[test]
    fn parallel_dispatch_matches_serial_as_a_set() {
        let items: Vec<i32> = (0..500).collect();
        let serial = Runtime::new(false).unwrap();
        let parallel = Runtime::new(true).unwrap();
        let f = |chunk: &[i32], _p: &mut ProgressReporter| {
            Ok(chunk.iter().map(|x| x * x).collect::<Vec<_>>())
        };
        let mut a = serial.dispatch(items.clone(), f, &NullSink).unwrap();
        let mut b = parallel.dispatch(items, f, &NullSink).unwrap();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }
}
