mod billing;
mod calendar;
mod cli;
mod config;
mod email;
mod error;
mod render;
mod run;
mod templates;

use std::process;

use crate::cli::Opts;
use clap::Parser;

fn main() {
    let opts = Opts::parse();

    if let Err(error) = run::run(opts) {
        eprintln!("{}", error);
        process::exit(1);
    }
}
