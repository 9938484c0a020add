//! # CLI Module
//!
//! This module contains the command-line interface implementation.
//! It uses clap for argument parsing with one subcommand per entry point:
//! `check` for terminals, `action` for CI, and the reserved `update`.

mod action;
mod check;
mod update;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use action::run_action;
use anyhow::{Context, Result};
pub use check::CheckArgs;
use check::run_check;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};
use licheck::check::{Verdict, check_licenses};
use licheck::config::Config;
use licheck::file_filter::PassthroughFilter;
use licheck::git::GitIgnoreFilter;
use licheck::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use licheck::output::{Reporter, emit_report};
use tracing::debug;
pub use update::UpdateArgs;
use update::run_update;

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Check license headers using the rules in license-config.json
  licheck check --config license-config.json

  # Check another directory, treating uncovered files as errors
  licheck check -c license-config.json --path ../project --strict

  # Skip files ignored by git
  licheck check -c license-config.json --gitignore

  # Run as a GitHub Action step (reads INPUT_PATH, INPUT_CONFIG, INPUT_STRICT)
  licheck action
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Suppress all output except warnings and errors
  #[arg(short, long, conflicts_with = "verbose", global = true)]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum,
    global = true
  )]
  pub colors: ColorMode,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Check license headers
  Check(CheckArgs),
  /// Update license headers. Currently, only updating "%year%" to the current
  /// year is planned
  Update(UpdateArgs),
  /// Check license headers inside a GitHub Actions step, reading inputs from
  /// the environment and reporting findings as annotations
  Action,
}

impl Cli {
  /// Parse CLI arguments.
  ///
  /// Usage errors exit with status 1; `--help` and `--version` exit with 0.
  pub fn parse_args() -> std::result::Result<Self, ExitCode> {
    Self::try_parse().map_err(|e| {
      let code = if e.use_stderr() { 1 } else { 0 };
      let _ = e.print();
      ExitCode::from(code)
    })
  }

  /// Configure logging and run the selected command.
  pub async fn run(self) -> ExitCode {
    init_tracing(self.quiet, self.verbose);
    if self.verbose > 0 {
      set_verbose();
    } else if self.quiet {
      set_quiet();
    }
    self.colors.apply();

    match self.command {
      Command::Check(args) => run_check(args).await,
      Command::Update(args) => run_update(&args),
      Command::Action => run_action().await,
    }
  }
}

/// Options shared by the CLI and the CI action.
#[derive(Debug, Clone)]
pub struct RunOptions {
  pub base_dir: PathBuf,
  pub config_path: PathBuf,
  pub strict: bool,
  pub gitignore: bool,
}

/// Load the configuration, check `base_dir` and report through `reporter`.
pub async fn run_checks(options: &RunOptions, reporter: &mut dyn Reporter) -> Result<Verdict> {
  let config = Config::load(&options.config_path)
    .with_context(|| format!("Failed to load config from {}", options.config_path.display()))?;

  reporter.start(&options.base_dir, config.len());

  let report = if options.gitignore {
    let filter = GitIgnoreFilter::discover(&options.base_dir)
      .await
      .context("Failed to determine git-ignored files")?;
    debug!("Excluding {} git-ignored file(s)", filter.len());
    check_licenses(&options.base_dir, &config, &filter).await?
  } else {
    check_licenses(&options.base_dir, &config, &PassthroughFilter).await?
  };

  Ok(emit_report(reporter, &report, options.strict))
}

/// Turn `path` into an absolute path without resolving symlinks.
fn absolute_dir(path: Option<&Path>) -> Result<PathBuf> {
  match path {
    Some(path) => {
      std::path::absolute(path).with_context(|| format!("Failed to resolve path {}", path.display()))
    }
    None => std::env::current_dir().context("Failed to get current directory"),
  }
}

const fn exit_code(verdict: &Verdict) -> ExitCode {
  if verdict.passed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
