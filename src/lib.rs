//! # licheck
//!
//! A tool that checks source files for the license header their configuration
//! requires.
//!
//! A configuration is a list of rules. Each rule selects files with include
//! and exclude glob patterns and may name a license template. Every selected
//! file must contain its template, where `%year%` stands for any four-digit
//! year. Files that no rule selects are reported as uncovered.
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use licheck::check::check_licenses;
//! use licheck::config::Config;
//! use licheck::file_filter::PassthroughFilter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::parse(r#"[{"include": ["src/**/*.rs"], "license": "HEADER.txt"}]"#)?;
//!     let report = check_licenses(Path::new("."), &config, &PassthroughFilter).await?;
//!
//!     for file in &report.uncovered {
//!         println!("Config does not cover the file '{}'", file.display());
//!     }
//!
//!     let verdict = report.verdict(false);
//!     println!("{}", verdict.summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`config`] - Rule configuration loading and validation
//! * [`collector`] - Glob resolution against a directory
//! * [`header`] - License template to header pattern compilation
//! * [`check`] - Rule evaluation, coverage and run reports
//! * [`file_filter`] / [`git`] - Filters applied to resolved files
//! * [`logging`] - Tracing setup and output modes
//! * [`output`] - Console and CI annotation reporters

pub mod check;
pub mod collector;
pub mod config;
pub mod file_filter;
pub mod git;
pub mod header;
pub mod logging;
pub mod output;
