//! # licheck
//!
//! A tool that checks source files for the license header their configuration
//! requires.

mod cli;

use std::process::ExitCode;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
  match Cli::parse_args() {
    Ok(cli) => cli.run().await,
    Err(code) => code,
  }
}
