//! # Logging Module
//!
//! This module provides logging utilities for licheck:
//! - A `tracing` subscriber for diagnostics, controlled by `-v`/`-q` and
//!   `RUST_LOG`
//! - A process-wide output mode (normal, quiet, verbose) for user-facing
//!   output
//! - Color mode selection backed by `owo-colors`
//!
//! Diagnostics go to stderr so stdout stays predictable for scripts.
//!
//! ## Example
//!
//! ```rust
//! use licheck::logging::{ColorMode, init_tracing, is_verbose, set_verbose};
//!
//! init_tracing(false, 1);
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! assert!(is_verbose());
//! tracing::info!("Checking {} rule(s)", 3);
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
