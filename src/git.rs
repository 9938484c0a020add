//! # Git Module
//!
//! Excludes git-ignored files from a check.
//!
//! The ignore decision is delegated to `git check-ignore`, so every source of
//! ignore rules git knows about (nested `.gitignore` files, `.git/info/exclude`,
//! the global excludes file) is honoured. Paths are passed over stdin in
//! fixed-size batches; batches run one after another and their answers are
//! merged into a single set before any rule is evaluated.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use git2::Repository;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::file_filter::{FileFilter, FilterResult};

/// Number of paths handed to one `git check-ignore` invocation.
pub const CHECK_IGNORE_BATCH_SIZE: usize = 100;

/// Find the root of the git working tree containing `path`, if any.
pub fn discover_repo_root(path: &Path) -> Result<Option<PathBuf>> {
  match Repository::discover(path) {
    Ok(repo) => Ok(repo.workdir().map(Path::to_path_buf)),
    Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("Failed to open git repository at {}", path.display())),
  }
}

/// Filter that skips files git ignores.
#[derive(Debug, Default, Clone)]
pub struct GitIgnoreFilter {
  ignored: HashSet<PathBuf>,
}

impl GitIgnoreFilter {
  /// Ask git which files below `base_dir` are ignored.
  ///
  /// # Errors
  ///
  /// Returns an error if `base_dir` is not inside a git working tree, or if
  /// `git` cannot be run.
  pub async fn discover(base_dir: &Path) -> Result<Self> {
    if discover_repo_root(base_dir)?.is_none() {
      bail!("'{}' is not inside a git working tree", base_dir.display());
    }

    let walk_root = base_dir.to_path_buf();
    let files = tokio::task::spawn_blocking(move || list_candidate_files(&walk_root))
      .await
      .context("File listing task failed")??;

    Self::for_files(base_dir, &files).await
  }

  /// Ask git which of `files` are ignored. `files` must live below `base_dir`.
  pub async fn for_files(base_dir: &Path, files: &[PathBuf]) -> Result<Self> {
    let relative: Vec<&Path> = files
      .iter()
      .filter_map(|file| file.strip_prefix(base_dir).ok())
      .collect();

    let mut ignored = HashSet::new();
    for batch in relative.chunks(CHECK_IGNORE_BATCH_SIZE) {
      for path in check_ignore(base_dir, batch).await? {
        ignored.insert(base_dir.join(path));
      }
    }

    debug!(
      "git reports {} of {} files as ignored",
      ignored.len(),
      relative.len()
    );

    Ok(Self { ignored })
  }

  pub fn is_ignored(&self, path: &Path) -> bool {
    self.ignored.contains(path)
  }

  /// Number of ignored files.
  pub fn len(&self) -> usize {
    self.ignored.len()
  }

  /// Whether git ignores none of the files.
  pub fn is_empty(&self) -> bool {
    self.ignored.is_empty()
  }
}

impl FileFilter for GitIgnoreFilter {
  fn should_process(&self, path: &Path) -> FilterResult {
    if self.is_ignored(path) {
      FilterResult::skip("Ignored by git")
    } else {
      FilterResult::process()
    }
  }
}

/// Every file or symlink below `base_dir`, except git's own metadata.
fn list_candidate_files(base_dir: &Path) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  let walker = WalkDir::new(base_dir)
    .follow_links(false)
    .min_depth(1)
    .into_iter()
    .filter_entry(|entry| entry.file_name() != ".git");

  for entry in walker {
    let entry = entry.with_context(|| format!("Failed to list files in {}", base_dir.display()))?;
    if entry.file_type().is_file() || entry.path_is_symlink() {
      files.push(entry.into_path());
    }
  }
  Ok(files)
}

/// Run one `git check-ignore` invocation and return the ignored paths.
async fn check_ignore(base_dir: &Path, paths: &[&Path]) -> Result<Vec<PathBuf>> {
  let mut input = Vec::new();
  for path in paths {
    input.extend_from_slice(path.to_string_lossy().as_bytes());
    input.push(0);
  }

  let mut child = Command::new("git")
    .args(["check-ignore", "--stdin", "-z"])
    .current_dir(base_dir)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("Failed to execute git check-ignore")?;

  {
    let mut stdin = child.stdin.take().context("git check-ignore has no stdin")?;
    stdin
      .write_all(&input)
      .await
      .context("Failed to write paths to git check-ignore")?;
  }

  let output = child
    .wait_with_output()
    .await
    .context("Failed to wait for git check-ignore")?;

  // Exit code 1 means none of the paths is ignored.
  match output.status.code() {
    Some(0) | Some(1) => {}
    _ => bail!(
      "git check-ignore failed: {}",
      String::from_utf8_lossy(&output.stderr).trim()
    ),
  }

  let ignored: Vec<PathBuf> = output
    .stdout
    .split(|byte| *byte == 0)
    .filter(|path| !path.is_empty())
    .map(|path| PathBuf::from(String::from_utf8_lossy(path).into_owned()))
    .collect();

  trace!("git check-ignore batch: {} of {} ignored", ignored.len(), paths.len());
  Ok(ignored)
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_discover_repo_root_from_subdirectory() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = temp_dir.path().canonicalize().expect("canonical root");
    Repository::init(&root).expect("init repository");
    let nested = root.join("src/deep");
    std::fs::create_dir_all(&nested).expect("create dirs");

    let found = discover_repo_root(&nested).expect("discover").expect("inside a repository");
    assert_eq!(found.canonicalize().expect("canonical workdir"), root);
  }

  #[test]
  fn test_filter_skips_ignored_paths() {
    let filter = GitIgnoreFilter {
      ignored: HashSet::from([PathBuf::from("/repo/target/out.rs")]),
    };

    let result = filter.should_process(Path::new("/repo/target/out.rs"));
    assert!(!result.should_process);
    assert_eq!(result.reason.as_deref(), Some("Ignored by git"));

    assert!(filter.should_process(Path::new("/repo/src/main.rs")).should_process);
  }

  #[test]
  fn test_list_candidate_files_skips_git_dir() {
    let temp_dir = TempDir::new().expect("create temp dir");
    std::fs::create_dir_all(temp_dir.path().join(".git/objects")).expect("create git dir");
    std::fs::write(temp_dir.path().join(".git/HEAD"), "ref").expect("write head");
    std::fs::write(temp_dir.path().join(".gitignore"), "*.log\n").expect("write gitignore");
    std::fs::write(temp_dir.path().join("a.log"), "log").expect("write file");

    let mut files = list_candidate_files(temp_dir.path()).expect("list files");
    files.sort();
    assert_eq!(
      files,
      vec![temp_dir.path().join(".gitignore"), temp_dir.path().join("a.log")]
    );
  }
}
