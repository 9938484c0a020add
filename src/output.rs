//! # Output Module
//!
//! This module centralizes all user-facing output for licheck.
//!
//! A [`Reporter`] receives the findings of a run. Two reporters exist:
//!
//! - [`ConsoleReporter`] prints colored messages for the CLI. Warnings and
//!   errors go to stderr; informational lines go to stdout and are silenced
//!   by `-q`.
//! - [`WorkflowReporter`] emits GitHub Actions workflow commands
//!   (`::warning::`, `::error::`) so findings show up as annotations.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::check::{CheckReport, Verdict};
use crate::logging::{is_quiet, is_verbose};

/// Symbols used in output
pub mod symbols {
  /// File has its license
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Missing license/failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// File not covered by any rule
  pub const WARNING: &str = "!";
}

/// Message reported for a file no rule covers.
pub fn uncovered_message(path: &Path) -> String {
  format!("Config does not cover the file '{}'", path.display())
}

/// Receiver for the findings of a run.
pub trait Reporter {
  /// Called once before any file is inspected.
  fn start(&mut self, _base_dir: &Path, _rule_count: usize) {}

  /// A file that contains its license.
  fn success(&mut self, _path: &Path) {}

  /// A file no rule covers.
  fn uncovered(&mut self, path: &Path);

  /// A file that lacks its license.
  fn failure(&mut self, message: &str);

  /// The overall outcome.
  fn verdict(&mut self, verdict: &Verdict);

  /// An error that aborted the run.
  fn fatal(&mut self, error: &dyn Display);
}

/// Feed `report` to `reporter` and return the verdict.
///
/// Uncovered files are reported first, then failures, then the summary.
pub fn emit_report(reporter: &mut dyn Reporter, report: &CheckReport, strict: bool) -> Verdict {
  for result in &report.results {
    if result.is_success() {
      reporter.success(result.path());
    }
  }

  for path in &report.uncovered {
    reporter.uncovered(path);
  }

  for failure in report.failures() {
    if let Some(message) = failure.message() {
      reporter.failure(message);
    }
  }

  let verdict = report.verdict(strict);
  reporter.verdict(&verdict);
  verdict
}

/// Reporter for terminal output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
  fn start(&mut self, base_dir: &Path, rule_count: usize) {
    if is_quiet() {
      return;
    }

    let rules_word = if rule_count == 1 { "rule" } else { "rules" };
    println!("Checking {} {} in {}...", rule_count, rules_word, base_dir.display());
  }

  fn success(&mut self, path: &Path) {
    if !is_verbose() {
      return;
    }

    println!(
      "  {} {}",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      path.display()
    );
  }

  fn uncovered(&mut self, path: &Path) {
    eprintln!(
      "{} {}",
      symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
      uncovered_message(path)
    );
  }

  fn failure(&mut self, message: &str) {
    eprintln!(
      "{} {}",
      symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
      message
    );
  }

  fn verdict(&mut self, verdict: &Verdict) {
    if verdict.passed {
      if !is_quiet() {
        println!(
          "{} {}",
          symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
          verdict.summary
        );
      }
    } else {
      eprintln!("{}", verdict.summary.if_supports_color(Stream::Stderr, |s| s.red()));
    }
  }

  fn fatal(&mut self, error: &dyn Display) {
    eprintln!(
      "{} {}",
      "ERROR:".if_supports_color(Stream::Stderr, |s| s.red()),
      error
    );
  }
}

/// Reporter emitting GitHub Actions workflow commands.
pub struct WorkflowReporter<W: Write> {
  out: W,
}

impl WorkflowReporter<std::io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }
}

impl<W: Write> WorkflowReporter<W> {
  pub const fn new(out: W) -> Self {
    Self { out }
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  fn emit(&mut self, command: Option<&str>, message: &str) {
    let line = match command {
      Some(command) => format!("::{}::{}", command, escape_data(message)),
      None => message.to_string(),
    };
    if let Err(e) = writeln!(self.out, "{line}") {
      eprintln!("Error writing workflow command: {e}");
    }
  }
}

impl<W: Write> Reporter for WorkflowReporter<W> {
  fn uncovered(&mut self, path: &Path) {
    self.emit(Some("warning"), &uncovered_message(path));
  }

  fn failure(&mut self, message: &str) {
    self.emit(Some("error"), message);
  }

  fn verdict(&mut self, verdict: &Verdict) {
    if verdict.passed {
      self.emit(None, &verdict.summary);
    } else {
      self.emit(Some("error"), &verdict.summary);
    }
  }

  fn fatal(&mut self, error: &dyn Display) {
    self.emit(Some("error"), &error.to_string());
  }
}

/// Escape the message part of a workflow command.
fn escape_data(data: &str) -> String {
  data.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
