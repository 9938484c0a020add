//! # Configuration Module
//!
//! This module loads the rule list that drives a license check.
//!
//! A configuration is a JSON (or JSON5) array of rules. Each rule names the
//! files it governs through `include`/`exclude` glob patterns and, optionally,
//! the license template those files must contain:
//!
//! ```json5
//! [
//!   { include: ["src/**/*.rs"], exclude: ["src/generated/**"], license: "HEADER.txt" },
//!   // files claimed without a header requirement
//!   { include: ["*.md", "Cargo.lock"] },
//! ]
//! ```
//!
//! The document is validated against the rule schema before it is
//! deserialized, so every violation is reported at once.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// One configuration entry binding file patterns to a license requirement.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Rule {
  /// Glob patterns selecting the files this rule governs. Never empty.
  pub include: Vec<String>,

  /// Glob patterns removed from the selection.
  #[serde(default)]
  pub exclude: Vec<String>,

  /// Path to the license template. Relative paths are resolved against the
  /// checked directory. A rule without a license only claims its files.
  #[serde(default)]
  pub license: Option<String>,
}

impl Rule {
  /// Create a rule that claims `include` and requires `license`.
  pub fn new(include: Vec<String>, license: Option<String>) -> Self {
    Self {
      include,
      exclude: Vec::new(),
      license,
    }
  }

  /// Replace the exclude patterns of this rule.
  pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
    self.exclude = exclude;
    self
  }
}

/// Ordered list of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
  pub rules: Vec<Rule>,
}

impl From<Vec<Rule>> for Config {
  fn from(rules: Vec<Rule>) -> Self {
    Self { rules }
  }
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// The config file is neither valid JSON nor valid JSON5.
  #[error("Parsing configuration has failed: {message}")]
  Parse { message: String },

  /// The document does not match the rule schema.
  #[error("Configuration validation has failed: '{}'", .violations.join(", "))]
  Validation { violations: Vec<String> },
}

impl Config {
  /// Load and validate the configuration stored at `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    debug!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config = Self::parse(&content)?;
    debug!("Loaded {} rule(s)", config.rules.len());
    Ok(config)
  }

  /// Parse and validate a configuration document.
  ///
  /// JSON5 is a superset of JSON, so a single parser covers both formats.
  pub fn parse(text: &str) -> Result<Self, ConfigError> {
    let document: Value = json5::from_str(text).map_err(|e| ConfigError::Parse { message: e.to_string() })?;

    let violations = validate(&document);
    if !violations.is_empty() {
      return Err(ConfigError::Validation { violations });
    }

    let rules: Vec<Rule> = serde_json::from_value(document).map_err(|e| ConfigError::Parse { message: e.to_string() })?;
    Ok(Self { rules })
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
    self.rules.iter()
  }
}

impl<'a> IntoIterator for &'a Config {
  type Item = &'a Rule;
  type IntoIter = std::slice::Iter<'a, Rule>;

  fn into_iter(self) -> Self::IntoIter {
    self.rules.iter()
  }
}

/// Check `document` against the rule schema and return every violation.
///
/// Violations are phrased against the document root `data`, e.g.
/// `data[1].include must be array`.
fn validate(document: &Value) -> Vec<String> {
  let mut violations = Vec::new();

  let Some(entries) = document.as_array() else {
    violations.push("data must be array".to_string());
    return violations;
  };

  for (index, entry) in entries.iter().enumerate() {
    let at = format!("data[{index}]");
    let Some(object) = entry.as_object() else {
      violations.push(format!("{at} must be object"));
      continue;
    };

    match object.get("include") {
      None => violations.push(format!("{at} must have required property 'include'")),
      Some(include) => {
        validate_string_array(include, &format!("{at}.include"), &mut violations);
        if include.as_array().is_some_and(Vec::is_empty) {
          violations.push(format!("{at}.include must NOT have fewer than 1 items"));
        }
      }
    }

    if let Some(exclude) = object.get("exclude") {
      validate_string_array(exclude, &format!("{at}.exclude"), &mut violations);
    }

    if let Some(license) = object.get("license")
      && !license.is_string()
    {
      violations.push(format!("{at}.license must be string"));
    }
  }

  violations
}

fn validate_string_array(value: &Value, at: &str, violations: &mut Vec<String>) {
  let Some(items) = value.as_array() else {
    violations.push(format!("{at} must be array"));
    return;
  };

  for (index, item) in items.iter().enumerate() {
    if !item.is_string() {
      violations.push(format!("{at}[{index}] must be string"));
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_parse_valid_config() {
    let config = Config::parse(
      r#"[
        {"include": ["**/*.rs"], "exclude": ["target/**"], "license": "HEADER.txt"},
        {"include": ["*.md"]}
      ]"#,
    )
    .expect("valid config should parse");

    assert_eq!(config.len(), 2);
    assert_eq!(config.rules[0].include, vec!["**/*.rs"]);
    assert_eq!(config.rules[0].exclude, vec!["target/**"]);
    assert_eq!(config.rules[0].license.as_deref(), Some("HEADER.txt"));
    assert!(config.rules[1].exclude.is_empty());
    assert!(config.rules[1].license.is_none());
  }

  #[test]
  fn test_parse_json5_config() {
    let config = Config::parse(
      "[\n  // Rust sources\n  { include: ['src/**/*.rs'], license: 'HEADER.txt', },\n]\n",
    )
    .expect("json5 config should parse");

    assert_eq!(config.rules, vec![Rule::new(vec!["src/**/*.rs".to_string()], Some("HEADER.txt".to_string()))]);
  }

  #[test]
  fn test_parse_empty_array() {
    let config = Config::parse("[]").expect("empty array should parse");
    assert!(config.is_empty());
  }

  #[test]
  fn test_unknown_keys_are_tolerated() {
    let config = Config::parse(r#"[{"include": ["a"], "comment": "vendored"}]"#).expect("should parse");
    assert_eq!(config.len(), 1);
  }

  #[test]
  fn test_missing_include_is_rejected() {
    let err = Config::parse(r#"[{"license": "HEADER.txt"}]"#).expect_err("should fail");
    assert!(matches!(err, ConfigError::Validation { .. }));
    assert_eq!(
      err.to_string(),
      "Configuration validation has failed: 'data[0] must have required property 'include''"
    );
  }

  #[test]
  fn test_all_violations_are_reported() {
    let err = Config::parse(r#"[{"include": "a"}, {"include": [1], "exclude": {}, "license": 3}, 7]"#)
      .expect_err("should fail");

    let ConfigError::Validation { violations } = err else {
      panic!("expected validation error, got {err:?}");
    };
    assert_eq!(
      violations,
      vec![
        "data[0].include must be array",
        "data[1].include[0] must be string",
        "data[1].exclude must be array",
        "data[1].license must be string",
        "data[2] must be object",
      ]
    );
  }

  #[test]
  fn test_empty_include_is_rejected() {
    let err = Config::parse(r#"[{"include": []}]"#).expect_err("should fail");
    assert!(err.to_string().contains("data[0].include must NOT have fewer than 1 items"));
  }

  #[test]
  fn test_non_array_document_is_rejected() {
    let err = Config::parse(r#"{"include": ["a"]}"#).expect_err("should fail");
    assert!(err.to_string().contains("data must be array"));
  }

  #[test]
  fn test_syntax_error_is_a_parse_error() {
    let err = Config::parse("[{include: ").expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Parsing configuration has failed"));
  }

  #[test]
  fn test_load_config_from_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let config_path = temp_dir.path().join("license-config.json");
    std::fs::write(&config_path, r#"[{"include": ["**"]}]"#).expect("write config");

    let config = Config::load(&config_path).expect("load should succeed");
    assert_eq!(config.len(), 1);
  }

  #[test]
  fn test_load_config_file_not_found() {
    let result = Config::load(Path::new("/nonexistent/path/license-config.json"));
    assert!(matches!(result.expect_err("should fail"), ConfigError::Read { .. }));
  }
}
