mod common;

use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use common::{init_git_repo, is_git_available, write_file};
use licheck::check::check_licenses;
use licheck::config::Config;
use licheck::git::{CHECK_IGNORE_BATCH_SIZE, GitIgnoreFilter};
use predicates::prelude::*;
use tempfile::tempdir;

#[tokio::test]
async fn test_ignored_files_are_neither_checked_nor_uncovered() -> Result<()> {
  if !is_git_available() {
    println!("Skipping test: git not available");
    return Ok(());
  }

  let temp_dir = tempdir()?;
  let root = temp_dir.path();
  init_git_repo(root)?;
  write_file(root, ".gitignore", "target/\n*.log\n")?;
  write_file(root, "HEADER.txt", "Copyright %year% Acme")?;
  write_file(root, "src/main.rs", "// Copyright 2024 Acme\nfn main() {}\n")?;
  write_file(root, "target/debug/build.rs", "fn generated() {}\n")?;
  write_file(root, "run.log", "log\n")?;

  let filter = GitIgnoreFilter::discover(root).await?;
  assert!(filter.is_ignored(&root.join("target/debug/build.rs")));
  assert!(filter.is_ignored(&root.join("run.log")));
  assert!(!filter.is_ignored(&root.join("src/main.rs")));

  let config = Config::parse(r#"[{"include": ["**/*.rs"], "license": "HEADER.txt"}]"#)?;
  let report = check_licenses(root, &config, &filter).await?;

  assert_eq!(report.results.len(), 1);
  assert_eq!(report.error_count(), 0);
  assert_eq!(report.uncovered.iter().collect::<Vec<_>>(), vec![&root.join("HEADER.txt")]);
  Ok(())
}

#[tokio::test]
async fn test_paths_are_checked_in_batches() -> Result<()> {
  if !is_git_available() {
    println!("Skipping test: git not available");
    return Ok(());
  }

  let temp_dir = tempdir()?;
  let root = temp_dir.path();
  init_git_repo(root)?;
  write_file(root, ".gitignore", "*.tmp\n")?;

  let count = CHECK_IGNORE_BATCH_SIZE * 2 + 7;
  let mut files = Vec::with_capacity(count);
  for i in 0..count {
    let name = if i % 2 == 0 { format!("f{i}.tmp") } else { format!("f{i}.rs") };
    write_file(root, &name, "x")?;
    files.push(root.join(name));
  }

  let filter = GitIgnoreFilter::for_files(root, &files).await?;
  assert_eq!(filter.len(), count.div_ceil(2));
  Ok(())
}

#[tokio::test]
async fn test_discover_outside_repository_fails() -> Result<()> {
  let temp_dir = tempdir()?;
  if licheck::git::discover_repo_root(temp_dir.path())?.is_some() {
    println!("Skipping test: temp directory is inside a git repository");
    return Ok(());
  }

  let err = GitIgnoreFilter::discover(temp_dir.path())
    .await
    .expect_err("should fail outside a repository");
  assert!(err.to_string().contains("not inside a git working tree"));
  Ok(())
}

#[test]
fn test_cli_gitignore_flag() -> Result<(), Box<dyn std::error::Error>> {
  if !is_git_available() {
    println!("Skipping test: git not available");
    return Ok(());
  }

  let temp_dir = tempdir()?;
  let root = temp_dir.path();
  init_git_repo(root)?;
  write_file(root, ".gitignore", "build/\n")?;
  write_file(root, "HEADER.txt", "Copyright %year% Acme")?;
  write_file(root, "src/lib.rs", "// Copyright 2023 Acme\n")?;
  write_file(root, "build/out.rs", "fn out() {}\n")?;
  write_file(root, "config.json", r#"[{"include": ["**/*.rs"], "license": "HEADER.txt"}, {"include": ["*.txt", "*.json"]}]"#)?;

  Command::cargo_bin("licheck")?
    .current_dir(root)
    .args(["--colors=never", "check", "-c", "config.json", "--strict"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("build/out.rs"));

  Command::cargo_bin("licheck")?
    .current_dir(root)
    .args(["--colors=never", "check", "-c", "config.json", "--strict", "--gitignore"])
    .assert()
    .success();

  Ok(())
}
