//! # Check Command
//!
//! Checks license headers below a directory and maps the outcome to the
//! process exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use licheck::output::{ConsoleReporter, Reporter};
use tracing::debug;

use super::{RunOptions, absolute_dir, exit_code, run_checks};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
  /// Path to the JSON or JSON5 config file
  #[arg(long, short = 'c', value_name = "FILE")]
  pub config: PathBuf,

  /// Path to working directory [default: current directory]
  #[arg(long, value_name = "DIR")]
  pub path: Option<PathBuf>,

  /// Treat files not covered by the configuration as errors
  #[arg(long)]
  pub strict: bool,

  /// Skip files ignored by git
  #[arg(long)]
  pub gitignore: bool,
}

impl CheckArgs {
  fn run_options(&self) -> Result<RunOptions> {
    Ok(RunOptions {
      base_dir: absolute_dir(self.path.as_deref())?,
      config_path: self.config.clone(),
      strict: self.strict,
      gitignore: self.gitignore,
    })
  }
}

/// Run the check command with the given arguments
pub async fn run_check(args: CheckArgs) -> ExitCode {
  let mut reporter = ConsoleReporter;

  let result = match args.run_options() {
    Ok(options) => {
      debug!("Running check with {:?}", options);
      run_checks(&options, &mut reporter).await
    }
    Err(e) => Err(e),
  };

  match result {
    Ok(verdict) => exit_code(&verdict),
    Err(e) => {
      reporter.fatal(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
