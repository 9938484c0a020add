//! # File Collector Module
//!
//! Resolves include/exclude glob patterns against a base directory.
//!
//! Patterns are matched against paths relative to the base directory with
//! shell-glob semantics: `*` and `?` stay within one path segment, `**` spans
//! any number of directories and `{a,b}` alternates.
//!
//! Wildcards never match a dot-prefixed path component (`.git`, `.github`).
//! Such a component is only matched where the include pattern spells out a
//! dot-segment at that position, so `.github/**` selects `.github/ci.yml` but
//! not `.github/.cache/state`. Exclude patterns apply to every path.
//!
//! An exclude pattern removes exactly the paths it matches. A directory is
//! pruned from the walk only when a pattern ending in `/**` excludes its whole
//! subtree.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use globset::{Candidate, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::check::CheckError;

/// Pattern that claims every file below the base directory.
pub const MATCH_ALL: &str = "**";

const GLOBSTAR: &str = "**";

/// Compiled include/exclude patterns of one file selection.
pub struct FileMatcher {
  include: GlobSet,
  /// Per include pattern: its brace-expanded alternatives, segment by segment.
  include_segments: Vec<Vec<SegmentPattern>>,
  exclude: GlobSet,
  /// Directories whose whole subtree is excluded.
  exclude_subtree: GlobSet,
}

impl FileMatcher {
  /// Compile the given patterns.
  ///
  /// The include patterns act as one alternation: a file is selected when any
  /// of them matches.
  pub fn new(include: &[String], exclude: &[String]) -> Result<Self, CheckError> {
    let include: Vec<&str> = include.iter().map(|p| strip_current_dir(p)).collect();
    let exclude: Vec<&str> = exclude.iter().map(|p| strip_current_dir(p)).collect();

    let include_segments = include
      .iter()
      .map(|pattern| {
        expand_braces(pattern)
          .iter()
          .map(|alternative| SegmentPattern::parse(alternative))
          .collect::<Result<Vec<_>, _>>()
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self {
      include: build_glob_set(include.iter().copied())?,
      include_segments,
      exclude: build_glob_set(exclude.iter().copied())?,
      exclude_subtree: build_glob_set(exclude.iter().filter_map(|p| subtree_root(p)))?,
    })
  }

  /// Whether the file at `relative` (relative to the base directory) is
  /// selected.
  pub fn is_match(&self, relative: &Path) -> bool {
    let candidate = Candidate::new(relative);
    if self.exclude.is_match_candidate(&candidate) {
      return false;
    }

    let components = components(relative);
    let hidden = components.iter().any(|name| is_hidden(name));
    self
      .include
      .matches_candidate(&candidate)
      .into_iter()
      .any(|index| !hidden || self.include_segments[index].iter().any(|alt| alt.admits_hidden(&components)))
  }

  /// Whether the walk has to descend into the directory at `relative`.
  fn should_descend(&self, relative: &Path) -> bool {
    if self.exclude_subtree.is_match(relative) {
      return false;
    }

    let components = components(relative);
    if !components.iter().any(|name| is_hidden(name)) {
      return true;
    }
    self
      .include_segments
      .iter()
      .flatten()
      .any(|alt| alt.may_contain_hidden(&components))
  }

  /// Walk `base_dir` and collect every file this matcher selects.
  ///
  /// Symlinks are listed but never descended into. A symlink is returned when
  /// it points at a regular file or at nothing; a dangling link then fails
  /// when it is read. Returned paths are `base_dir` joined with the relative
  /// path, in file name order.
  pub fn collect(&self, base_dir: &Path) -> Result<Vec<PathBuf>, CheckError> {
    let start_time = std::time::Instant::now();
    let mut files = Vec::new();

    let walker = WalkDir::new(base_dir)
      .follow_links(false)
      .sort_by_file_name()
      .min_depth(1)
      .into_iter()
      .filter_entry(|entry| {
        if !entry.file_type().is_dir() {
          return true;
        }
        let relative = entry.path().strip_prefix(base_dir).unwrap_or(entry.path());
        let descend = self.should_descend(relative);
        if !descend {
          trace!("Pruning directory: {}", relative.display());
        }
        descend
      });

    for entry in walker {
      let entry = entry.map_err(|e| CheckError::Scan { message: e.to_string() })?;
      let file_type = entry.file_type();
      let is_candidate = file_type.is_file() || (file_type.is_symlink() && links_to_file(entry.path()));
      if !is_candidate {
        continue;
      }

      let relative = entry.path().strip_prefix(base_dir).unwrap_or(entry.path());
      if self.is_match(relative) {
        files.push(base_dir.join(relative));
      }
    }

    debug!(
      "Matched {} files in {} in {}ms",
      files.len(),
      base_dir.display(),
      start_time.elapsed().as_millis()
    );

    Ok(files)
  }
}

/// Resolve `include`/`exclude` against `base_dir` into a list of files.
///
/// No include patterns select nothing and touch no files.
pub fn find_files(base_dir: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>, CheckError> {
  if include.is_empty() {
    return Ok(Vec::new());
  }

  FileMatcher::new(include, exclude)?.collect(base_dir)
}

/// One brace-free include alternative, split at `/`.
struct SegmentPattern {
  segments: Vec<Segment>,
}

enum Segment {
  Globstar,
  /// A segment starting with `.`, the only kind that matches hidden names.
  Dot(GlobMatcher),
  Plain,
}

impl Segment {
  fn admits(&self, name: &str) -> bool {
    match self {
      Self::Dot(matcher) => matcher.is_match(name),
      Self::Globstar | Self::Plain => false,
    }
  }
}

impl SegmentPattern {
  fn parse(pattern: &str) -> Result<Self, CheckError> {
    let segments = pattern
      .split('/')
      .map(|segment| {
        if segment == GLOBSTAR {
          Ok(Segment::Globstar)
        } else if is_hidden(segment) {
          compile_glob(segment).map(|glob| Segment::Dot(glob.compile_matcher()))
        } else {
          Ok(Segment::Plain)
        }
      })
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self { segments })
  }

  fn globstars(&self) -> Option<(usize, usize)> {
    let first = self.segments.iter().position(|s| matches!(s, Segment::Globstar))?;
    let last = self.segments.iter().rposition(|s| matches!(s, Segment::Globstar))?;
    Some((first, last))
  }

  /// Segments strictly between the first and last `**`, whose position in a
  /// path is not fixed.
  fn floating(&self, first: usize, last: usize) -> &[Segment] {
    if last > first { &self.segments[first + 1..last] } else { &[] }
  }

  /// Whether every hidden component of a matched file path lines up with a
  /// dot-segment of this pattern.
  ///
  /// Segments before the first `**` are anchored at the start of the path,
  /// segments after the last `**` at its end.
  fn admits_hidden(&self, components: &[Cow<'_, str>]) -> bool {
    let n = self.segments.len();
    let m = components.len();

    components
      .iter()
      .enumerate()
      .filter(|(_, name)| is_hidden(name))
      .all(|(i, name)| match self.globstars() {
        None => n == m && self.segments[i].admits(name),
        Some((first, last)) => {
          let from_end = m - 1 - i;
          if i < first {
            self.segments[i].admits(name)
          } else if from_end < n - 1 - last {
            self.segments[n - 1 - from_end].admits(name)
          } else {
            self.floating(first, last).iter().any(|s| s.admits(name))
          }
        }
      })
  }

  /// Whether a file below the directory `components` could be admitted.
  fn may_contain_hidden(&self, components: &[Cow<'_, str>]) -> bool {
    let first = self.globstars().map_or(self.segments.len(), |(first, _)| first);

    components
      .iter()
      .enumerate()
      .filter(|(_, name)| is_hidden(name))
      .all(|(i, name)| {
        if i < first {
          self.segments.get(i).is_some_and(|s| s.admits(name))
        } else {
          self.segments.get(first + 1..).is_some_and(|rest| rest.iter().any(|s| s.admits(name)))
        }
      })
  }
}

fn compile_glob(pattern: &str) -> Result<globset::Glob, CheckError> {
  GlobBuilder::new(pattern)
    .literal_separator(true)
    .backslash_escape(true)
    .build()
    .map_err(|e| CheckError::Scan {
      message: format!("invalid pattern '{pattern}': {e}"),
    })
}

fn build_glob_set<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<GlobSet, CheckError> {
  let mut builder = GlobSetBuilder::new();
  for pattern in patterns {
    builder.add(compile_glob(pattern)?);
  }
  builder.build().map_err(|e| CheckError::Scan { message: e.to_string() })
}

/// The directory pattern whose subtree `pattern` excludes entirely, if any.
fn subtree_root(pattern: &str) -> Option<&str> {
  if pattern == GLOBSTAR {
    return Some(pattern);
  }
  pattern.strip_suffix("/**").filter(|root| !root.is_empty())
}

/// Expand `{a,b}` alternations into one pattern per alternative.
fn expand_braces(pattern: &str) -> Vec<String> {
  let Some((open, close, commas)) = find_brace_group(pattern) else {
    return vec![pattern.to_string()];
  };

  let prefix = &pattern[..open];
  let suffix = &pattern[close + 1..];
  let mut bounds = vec![open];
  bounds.extend(commas);
  bounds.push(close);

  bounds
    .windows(2)
    .flat_map(|pair| expand_braces(&format!("{prefix}{}{suffix}", &pattern[pair[0] + 1..pair[1]])))
    .collect()
}

/// Byte offsets of the first balanced `{...}` group and its top-level commas.
fn find_brace_group(pattern: &str) -> Option<(usize, usize, Vec<usize>)> {
  let bytes = pattern.as_bytes();
  let open = {
    let mut i = 0;
    loop {
      match bytes.get(i)? {
        b'\\' => i += 2,
        b'{' => break i,
        _ => i += 1,
      }
    }
  };

  let mut depth = 0usize;
  let mut commas = Vec::new();
  let mut i = open;
  while let Some(byte) = bytes.get(i) {
    match byte {
      b'\\' => i += 1,
      b'{' => depth += 1,
      b'}' => {
        depth -= 1;
        if depth == 0 {
          return Some((open, i, commas));
        }
      }
      b',' if depth == 1 => commas.push(i),
      _ => {}
    }
    i += 1;
  }
  None
}

fn strip_current_dir(pattern: &str) -> &str {
  pattern.strip_prefix("./").unwrap_or(pattern)
}

fn components(relative: &Path) -> Vec<Cow<'_, str>> {
  relative
    .components()
    .map(|component| component.as_os_str().to_string_lossy())
    .collect()
}

fn is_hidden(name: &str) -> bool {
  name.starts_with('.') && name != "." && name != ".."
}

/// Whether a symlink resolves to a regular file. Dangling links count as
/// files.
fn links_to_file(path: &Path) -> bool {
  std::fs::metadata(path).map_or(true, |metadata| metadata.is_file())
}
