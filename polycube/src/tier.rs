//! Module inductively building tier `n` from tier `n-1` (spec.md §4.5).

use crate::archive::{cache_exists, load_cache, save_cache};
use crate::canonical::canonical_shape_invariant;
use crate::dispatch::{NullSink, ProgressReporter, ProgressSink, Runtime};
use crate::error::{Error, Result};
use crate::expand::expand;
use crate::grid::{Grid, Identifier};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn base_cube() -> Result<Grid> {
    let mut g = Grid::zeros(1, 1, 1)?;
    g.set(0, 0, 0);
    Ok(g)
}

fn base_bar() -> Result<Grid> {
    let mut g = Grid::zeros(2, 1, 1)?;
    g.set(0, 0, 0);
    g.set(1, 0, 0);
    Ok(g)
}

/// Expands every base polycube in a chunk by one cube and reduces to its
/// parallel-safe canonical identifier (spec.md §4.4's shape-invariant path).
/// Duplicates across bases and across chunks are expected; deduplication
/// happens in the caller once every chunk's local set has been produced.
fn hash_task(chunk: &[Grid], reporter: &mut ProgressReporter) -> Result<Vec<Identifier>> {
    let mut local: FxHashSet<Identifier> = FxHashSet::default();
    for (i, base) in chunk.iter().enumerate() {
        for child in expand(base)? {
            local.insert(canonical_shape_invariant(&child));
        }
        reporter.report(i + 1);
    }
    Ok(local.into_iter().collect())
}

fn unpack_task(chunk: &[Identifier], reporter: &mut ProgressReporter) -> Result<Vec<Grid>> {
    let mut out = Vec::with_capacity(chunk.len());
    for (i, id) in chunk.iter().enumerate() {
        out.push(id.unpack()?);
        reporter.report(i + 1);
    }
    Ok(out)
}

/// Inductively computes `S(n)`, the complete set of free polycubes of size `n`,
/// consulting and populating the on-disk cache under `cache_dir` when
/// `use_cache` is set.
///
/// A tier's archive write is atomic: the full tier is computed in memory
/// before anything is written, and the archive write itself renames into
/// place, so a crash mid-tier never leaves a partial cache file (spec.md §7
/// failure model).
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] propagated from [`Grid`] construction,
/// or any archive/worker failure surfaced by the cache or dispatcher.
pub fn generate_with(
    n: u32,
    use_cache: bool,
    cache_dir: &Path,
    runtime: &Runtime,
    sink: &dyn ProgressSink,
) -> Result<Vec<Grid>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if n == 1 {
        return Ok(vec![base_cube()?]);
    }
    if n == 2 {
        return Ok(vec![base_bar()?]);
    }

    if use_cache && cache_exists(cache_dir, n) {
        let ids = load_cache(cache_dir, n)?;
        return ids.iter().map(Identifier::unpack).collect();
    }

    let prev = generate_with(n - 1, use_cache, cache_dir, runtime, sink)?;

    let hashed = runtime.dispatch(prev, hash_task, sink)?;
    let tier_set: FxHashSet<Identifier> = hashed.into_iter().collect();
    let unique: Vec<Identifier> = tier_set.into_iter().collect();

    let grids = runtime.dispatch(unique, unpack_task, sink)?;

    if use_cache && !cache_exists(cache_dir, n) {
        let ids: Vec<Identifier> = grids.iter().map(Grid::pack).collect();
        save_cache(cache_dir, n, &ids)?;
    }

    Ok(grids)
}

/// Public entry point: `generate(n, use_cache, parallel)` from spec.md §6.
///
/// Builds a default [`Runtime`] and a silent progress sink, and caches under
/// `./cache`. Callers that need custom progress rendering or a non-default
/// cache location should build their own [`Runtime`] and call
/// [`generate_with`] directly — this is what `polycube-cli` does.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `n` is negative.
pub fn generate(n: i64, use_cache: bool, parallel: bool) -> Result<Vec<Grid>> {
    if n < 0 {
        return Err(Error::InvalidArgument(format!(
            "n must be non-negative, got {n}"
        )));
    }
    let runtime = Runtime::new(parallel)?;
    generate_with(n as u32, use_cache, &default_cache_dir(), &runtime, &NullSink)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A000162: [usize; 10] = [1, 1, 2, 8, 29, 166, 1023, 6922, 48311, 346543];

    fn tmp_cache_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("polycube-tier-test-{tag}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn generate_zero_is_empty() {
        assert!(generate(0, false, false).unwrap().is_empty());
    }

    #[test]
    fn generate_one_is_single_cube() {
        let g = generate(1, false, false).unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].shape(), (1, 1, 1));
    }

    #[test]
    fn generate_two_is_single_bar() {
        let g = generate(2, false, false).unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].shape(), (2, 1, 1));
    }

    #[test]
    fn rejects_negative_n() {
        assert!(generate(-1, false, false).is_err());
    }

    #[test]
    fn counts_match_a000162_up_to_6_p1() {
        let dir = tmp_cache_dir("counts");
        let runtime = Runtime::new(false).unwrap();
        for n in 1..=6u32 {
            let grids = generate_with(n, false, &dir, &runtime, &NullSink).unwrap();
            assert_eq!(
                grids.len(),
                A000162[n as usize - 1],
                "tier {n} count mismatch"
            );
        }
    }

    #[test]
    fn identifiers_are_distinct_p3() {
        let dir = tmp_cache_dir("distinct");
        let runtime = Runtime::new(false).unwrap();
        let grids = generate_with(5, false, &dir, &runtime, &NullSink).unwrap();
        let ids: FxHashSet<_> = grids.iter().map(Grid::pack).collect();
        assert_eq!(ids.len(), grids.len());
    }

    #[test]
    fn parallel_matches_serial_as_sets_p10() {
        let dir_s = tmp_cache_dir("p10-serial");
        let dir_p = tmp_cache_dir("p10-parallel");
        let serial_rt = Runtime::new(false).unwrap();
        let parallel_rt = Runtime::new(true).unwrap();
        let serial = generate_with(6, false, &dir_s, &serial_rt, &NullSink).unwrap();
        let parallel = generate_with(6, false, &dir_p, &parallel_rt, &NullSink).unwrap();
        let mut a: Vec<_> = serial.iter().map(Grid::pack).collect();
        let mut b: Vec<_> = parallel.iter().map(Grid::pack).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn cache_roundtrip_reuses_archive() {
        let dir = tmp_cache_dir("cache-reuse");
        let runtime = Runtime::new(false).unwrap();
        let first = generate_with(4, true, &dir, &runtime, &NullSink).unwrap();
        assert!(cache_exists(&dir, 4));
        let second = generate_with(4, true, &dir, &runtime, &NullSink).unwrap();
        let mut a: Vec<_> = first.iter().map(Grid::pack).collect();
        let mut b: Vec<_> = second.iter().map(Grid::pack).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        std::fs::remove_dir_all(&dir).ok();
    }
}
