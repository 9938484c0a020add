//! # File Filter Module
//!
//! Filters decide whether a resolved file takes part in a check at all. They
//! are applied after glob resolution, both to the files a rule checks and to
//! the universe of files considered for coverage.

use std::path::Path;

/// Result of a file filtering operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the file should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the file should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter files based on certain criteria.
pub trait FileFilter: Send + Sync {
  /// Determines whether a file should be processed.
  ///
  /// `path` has the form produced by glob resolution: the checked directory
  /// joined with the file's relative path.
  fn should_process(&self, path: &Path) -> FilterResult;
}

/// Filter that lets every file through.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughFilter;

impl FileFilter for PassthroughFilter {
  fn should_process(&self, _path: &Path) -> FilterResult {
    FilterResult::process()
  }
}
