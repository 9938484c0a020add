//! # Update Command
//!
//! Reserved for rewriting `%year%` positions to the current year. Only the
//! command line surface exists so far.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use licheck::output::{ConsoleReporter, Reporter};

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
  /// Path to the JSON or JSON5 config file
  #[arg(long, short = 'c', value_name = "FILE")]
  pub config: PathBuf,

  /// Path to working directory [default: current directory]
  #[arg(long, value_name = "DIR")]
  pub path: Option<PathBuf>,
}

/// The update command modifies nothing yet and always fails.
pub fn run_update(_args: &UpdateArgs) -> ExitCode {
  ConsoleReporter.fatal(&"unknown command specified, has to be 'check'");
  ExitCode::FAILURE
}
