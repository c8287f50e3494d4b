#![allow(missing_docs)]

mod render;

use anyhow::{Context, Result};
use clap::Parser;
use git_version::git_version;
use polycube::dispatch::{ProgressSink, Runtime};
use polycube::tier::generate_with;
use std::path::PathBuf;
use std::process::ExitCode;

/// Resolves a `--flag`/`--no-flag` pair: whichever was specified wins;
/// `clap`'s `overrides_with` guarantees at most one of `positive`/`negative`
/// is `true` once both have been parsed, so ties can't happen.
fn resolve_flag(positive: bool, negative: bool, default: bool) -> bool {
    if positive {
        true
    } else if negative {
        false
    } else {
        default
    }
}

#[derive(Parser)]
#[command(
    arg_required_else_help = true,
    author,
    about = "Enumerate all free polycubes of a given size",
    name = "polycube",
    version = git_version!(
        args = ["--always", "--dirty", "--long", "--tags"],
        cargo_prefix = "",
        fallback = "unknown"
    )
)]
pub struct Opts {
    /// Number of unit cubes per polycube.
    #[arg(value_name = "N")]
    pub n: i64,

    /// Use the on-disk tier cache.
    #[arg(long = "cache", overrides_with = "no_cache")]
    cache: bool,
    /// Ignore the on-disk tier cache.
    #[arg(long = "no-cache", overrides_with = "cache")]
    no_cache: bool,

    /// Spread tier computation across all available cores.
    #[arg(long = "multicore", overrides_with = "no_multicore")]
    multicore: bool,
    /// Run tier computation on a single core.
    #[arg(long = "no-multicore", overrides_with = "multicore")]
    no_multicore: bool,

    /// Hand the result to the external voxel renderer.
    #[arg(long = "render", overrides_with = "no_render")]
    render: bool,
    /// Skip rendering (default).
    #[arg(long = "no-render", overrides_with = "render")]
    no_render: bool,

    /// Directory backing the on-disk tier cache.
    #[arg(long, default_value = "cache", value_name = "DIR")]
    cache_dir: PathBuf,
}

impl Opts {
    #[must_use]
    pub fn use_cache(&self) -> bool {
        resolve_flag(self.cache, self.no_cache, true)
    }

    #[must_use]
    pub fn multicore(&self) -> bool {
        resolve_flag(self.multicore, self.no_multicore, false)
    }

    #[must_use]
    pub fn should_render(&self) -> bool {
        resolve_flag(self.render, self.no_render, false)
    }
}

struct StderrSink;

impl ProgressSink for StderrSink {
    fn on_update(&self, line: &str) {
        eprint!("\r{line}          ");
    }
}

/// Runs the `polycube` command, returning the process exit code.
///
/// # Errors
///
/// Returns an error if `n` is negative, a cache/archive I/O operation fails,
/// or a worker in the parallel dispatch fails.
pub fn run(opts: &Opts) -> Result<ExitCode> {
    if opts.n < 0 {
        anyhow::bail!("N must be non-negative, got {}", opts.n);
    }
    let n: u32 = opts
        .n
        .try_into()
        .context("N is too large to enumerate")?;

    let runtime = Runtime::new(opts.multicore()).context("failed to start the worker pool")?;
    let sink = StderrSink;

    let grids = generate_with(n, opts.use_cache(), &opts.cache_dir, &runtime, &sink)
        .with_context(|| format!("failed to generate tier {n}"))?;
    eprintln!();
    println!("{} free polycubes of size {n}", grids.len());

    if opts.should_render() {
        render::render(&grids)?;
    }

    Ok(ExitCode::SUCCESS)
}
