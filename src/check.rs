//! # Check Module
//!
//! Evaluates a configuration against a directory.
//!
//! Two independent questions are answered for every run:
//!
//! * **Correctness**: does every file claimed by a licensed rule contain that
//!   rule's header? Each (rule, file) pair yields one [`CheckResult`].
//! * **Coverage**: which files are claimed by no rule at all?
//!
//! A file can be covered and still fail its check; the two are reported
//! separately in a [`CheckReport`].
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use licheck::check::check_licenses;
//! use licheck::config::Config;
//! use licheck::file_filter::PassthroughFilter;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load(Path::new("license-config.json"))?;
//! let report = check_licenses(Path::new("."), &config, &PassthroughFilter).await?;
//!
//! for failure in report.failures() {
//!   eprintln!("{}", failure.message().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, trace};

use crate::collector::{MATCH_ALL, find_files};
use crate::config::{Config, ConfigError, Rule};
use crate::file_filter::FileFilter;
use crate::header::HeaderPattern;

/// Concurrent file reads per CPU while checking one rule.
const READS_PER_CPU: usize = 8;

/// Errors that abort a check run.
///
/// A file without the required header is not an error; it is reported as a
/// [`CheckResult::Failure`].
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("Failed to read license file '{path}': {source}")]
  TemplateRead { path: PathBuf, source: std::io::Error },

  #[error("Invalid license template '{path}': {source}")]
  InvalidTemplate { path: PathBuf, source: regex::Error },

  #[error("Error while reading file '{path}': '{message}'")]
  FileRead { path: PathBuf, message: String },

  #[error("scanning files has failed with error '{message}'")]
  Scan { message: String },

  #[error("Background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

/// Outcome of checking one file against one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
  Success { path: PathBuf },
  Failure { path: PathBuf, message: String },
}

impl CheckResult {
  pub fn path(&self) -> &Path {
    match self {
      Self::Success { path } | Self::Failure { path, .. } => path,
    }
  }

  pub const fn is_success(&self) -> bool {
    matches!(self, Self::Success { .. })
  }

  /// The human-readable failure message, if this is a failure.
  pub fn message(&self) -> Option<&str> {
    match self {
      Self::Success { .. } => None,
      Self::Failure { message, .. } => Some(message),
    }
  }
}

/// Results and uncovered files of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
  /// Check results in rule order, then file order.
  pub results: Vec<CheckResult>,
  /// Files no rule claims.
  pub uncovered: BTreeSet<PathBuf>,
}

/// Overall outcome of a run, shared by the CLI and the CI action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
  pub passed: bool,
  pub summary: String,
}

impl CheckReport {
  pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
    self.results.iter().filter(|result| !result.is_success())
  }

  pub fn error_count(&self) -> usize {
    self.failures().count()
  }

  pub fn warning_count(&self) -> usize {
    self.uncovered.len()
  }

  /// Decide the outcome. Strict mode treats uncovered files as errors.
  pub fn verdict(&self, strict: bool) -> Verdict {
    let errors = self.error_count();
    let warnings = self.warning_count();

    if strict {
      Verdict {
        passed: errors == 0 && warnings == 0,
        summary: format!("{errors} error(s) and {warnings} warning(s) found. Warnings are treated as errors."),
      }
    } else if errors != 0 {
      Verdict {
        passed: false,
        summary: format!("{errors} error(s) found"),
      }
    } else {
      Verdict {
        passed: true,
        summary: format!("{errors} error(s) and {warnings} warning(s) found."),
      }
    }
  }
}

/// Load the configuration at `config_path` and check `base_dir` against it.
pub async fn check_licenses_from_path(
  base_dir: &Path,
  config_path: &Path,
  filter: &dyn FileFilter,
) -> Result<CheckReport, CheckError> {
  let config = Config::load(config_path)?;
  check_licenses(base_dir, &config, filter).await
}

/// Check every rule of `config` and compute the uncovered files.
///
/// Rules are evaluated concurrently and independently; results for a file
/// claimed by several licensed rules accumulate.
pub async fn check_licenses(base_dir: &Path, config: &Config, filter: &dyn FileFilter) -> Result<CheckReport, CheckError> {
  debug!("Checking {} rule(s) in {}", config.len(), base_dir.display());

  let rule_checks = try_join_all(config.iter().map(|rule| check_rule(base_dir, rule, filter)));
  let coverage = uncovered_files(base_dir, &config.rules, filter);
  let (per_rule, uncovered) = tokio::try_join!(rule_checks, coverage)?;

  Ok(CheckReport {
    results: per_rule.into_iter().flatten().collect(),
    uncovered,
  })
}

/// Check the files claimed by one rule against its license template.
///
/// A rule without a license yields no results. Any unreadable file aborts the
/// whole rule.
pub async fn check_rule(base_dir: &Path, rule: &Rule, filter: &dyn FileFilter) -> Result<Vec<CheckResult>, CheckError> {
  let Some(license) = rule.license.as_deref() else {
    trace!("Rule {:?} has no license, nothing to check", rule.include);
    return Ok(Vec::new());
  };

  let license_path = resolve_license_path(base_dir, license);
  let template = tokio::fs::read_to_string(&license_path)
    .await
    .map_err(|e| CheckError::TemplateRead {
      path: license_path.clone(),
      source: e,
    })?;
  let pattern = HeaderPattern::compile(&template).map_err(|e| CheckError::InvalidTemplate {
    path: license_path.clone(),
    source: e,
  })?;

  let files: Vec<PathBuf> = resolve_files(base_dir, rule)
    .await?
    .into_iter()
    .filter(|file| passes_filter(filter, file))
    .collect();

  debug!(
    "Checking {} file(s) against {}",
    files.len(),
    license_path.display()
  );

  let pattern = &pattern;
  let license_path = license_path.as_path();
  stream::iter(files)
    .map(move |file| check_file(file, pattern, license_path))
    .buffered(read_concurrency())
    .try_collect()
    .await
}

/// Files below `base_dir` that no rule claims, after applying `filter`.
///
/// Coverage ignores check outcomes: a rule claims a file by naming it in its
/// include/exclude patterns, with or without a license.
pub async fn uncovered_files(
  base_dir: &Path,
  rules: &[Rule],
  filter: &dyn FileFilter,
) -> Result<BTreeSet<PathBuf>, CheckError> {
  let all_files = resolve_patterns(base_dir, vec![MATCH_ALL.to_string()], Vec::new()).await?;

  let covered: HashSet<PathBuf> = try_join_all(rules.iter().map(|rule| resolve_files(base_dir, rule)))
    .await?
    .into_iter()
    .flatten()
    .collect();

  let uncovered: BTreeSet<PathBuf> = all_files
    .into_iter()
    .filter(|file| passes_filter(filter, file))
    .filter(|file| !covered.contains(file))
    .collect();

  debug!("{} file(s) are not covered by any rule", uncovered.len());
  Ok(uncovered)
}

fn resolve_license_path(base_dir: &Path, license: &str) -> PathBuf {
  let license = Path::new(license);
  if license.is_absolute() {
    license.to_path_buf()
  } else {
    base_dir.join(license)
  }
}

async fn resolve_files(base_dir: &Path, rule: &Rule) -> Result<Vec<PathBuf>, CheckError> {
  resolve_patterns(base_dir, rule.include.clone(), rule.exclude.clone()).await
}

/// Directory walks block, so they run off the async workers.
async fn resolve_patterns(
  base_dir: &Path,
  include: Vec<String>,
  exclude: Vec<String>,
) -> Result<Vec<PathBuf>, CheckError> {
  let base_dir = base_dir.to_path_buf();
  tokio::task::spawn_blocking(move || find_files(&base_dir, &include, &exclude)).await?
}

fn passes_filter(filter: &dyn FileFilter, file: &Path) -> bool {
  let result = filter.should_process(file);
  if !result.should_process {
    trace!(
      "Skipping: {} ({})",
      file.display(),
      result.reason.as_deref().unwrap_or("Unknown reason")
    );
  }
  result.should_process
}

async fn check_file(file: PathBuf, pattern: &HeaderPattern, license_path: &Path) -> Result<CheckResult, CheckError> {
  let bytes = tokio::fs::read(&file).await.map_err(|e| CheckError::FileRead {
    path: file.clone(),
    message: e.to_string(),
  })?;
  let content = String::from_utf8_lossy(&bytes);

  if pattern.is_match(&content) {
    trace!("{} contains the license", file.display());
    Ok(CheckResult::Success { path: file })
  } else {
    let message = format!(
      "'{}' does not contain license from '{}'",
      file.display(),
      license_path.display()
    );
    Ok(CheckResult::Failure { path: file, message })
  }
}

fn read_concurrency() -> usize {
  num_cpus::get().max(1) * READS_PER_CPU
}
