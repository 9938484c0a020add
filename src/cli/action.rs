//! # Action Command
//!
//! Runs the check as a GitHub Actions step. Inputs arrive as `INPUT_<NAME>`
//! environment variables; findings are reported as workflow annotations.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use licheck::output::{Reporter, WorkflowReporter};

use super::{RunOptions, absolute_dir, exit_code, run_checks};

/// Inputs of the action step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActionInputs {
  path: Option<PathBuf>,
  config: PathBuf,
  strict: bool,
  gitignore: bool,
}

impl ActionInputs {
  /// Read the inputs from the process environment.
  fn from_env() -> Result<Self> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Read the inputs through `lookup`, which maps a variable name to its
  /// value. Values are trimmed; empty values count as unset.
  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let input = |name: &str| {
      lookup(&format!("INPUT_{}", name.to_uppercase()))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    let Some(config) = input("config") else {
      bail!("Input required and not supplied: config");
    };

    Ok(Self {
      path: input("path").map(PathBuf::from),
      config: PathBuf::from(config),
      strict: input("strict").as_deref() == Some("true"),
      gitignore: input("gitignore").as_deref() == Some("true"),
    })
  }

  fn run_options(&self) -> Result<RunOptions> {
    Ok(RunOptions {
      base_dir: absolute_dir(self.path.as_deref())?,
      config_path: self.config.clone(),
      strict: self.strict,
      gitignore: self.gitignore,
    })
  }
}

/// Run the check inside a GitHub Actions step.
///
/// A failed run is reported with an `::error::` annotation and exit status 1,
/// which marks the step as failed.
pub async fn run_action() -> ExitCode {
  let mut reporter = WorkflowReporter::stdout();

  let result = match ActionInputs::from_env().and_then(|inputs| inputs.run_options()) {
    Ok(options) => run_checks(&options, &mut reporter).await,
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

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| vars.get(name).cloned()
  }

  #[test]
  fn test_inputs_from_environment() {
    let inputs = ActionInputs::from_lookup(lookup(&[
      ("INPUT_PATH", "repo"),
      ("INPUT_CONFIG", " .github/license-config.json "),
      ("INPUT_STRICT", "true"),
    ]))
    .expect("inputs");

    assert_eq!(
      inputs,
      ActionInputs {
        path: Some(PathBuf::from("repo")),
        config: PathBuf::from(".github/license-config.json"),
        strict: true,
        gitignore: false,
      }
    );
  }

  #[test]
  fn test_strict_requires_literal_true() {
    let inputs =
      ActionInputs::from_lookup(lookup(&[("INPUT_CONFIG", "c.json"), ("INPUT_STRICT", "yes")])).expect("inputs");
    assert!(!inputs.strict);
    assert!(inputs.path.is_none());
  }

  #[test]
  fn test_missing_config_is_an_error() {
    let err = ActionInputs::from_lookup(lookup(&[("INPUT_CONFIG", "  ")])).expect_err("should fail");
    assert_eq!(err.to_string(), "Input required and not supplied: config");
  }
}
