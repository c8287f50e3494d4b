#![allow(missing_docs)]

use clap::Parser;
use polycube_cli::{run, Opts};
use std::process::{ExitCode, Termination};

fn main() -> ExitCode {
    let opts = Opts::parse();

    match run(&opts) {
        Ok(code) => code,
        result @ Err(_) => result.report(),
    }
}
