//! publint-gate core library.
//!
//! This crate runs a package linter as a release gate: it lints a package,
//! logs the messages bucketed by severity, and signals failure when errors
//! (or, in strict mode, warnings) were reported.
//!
//! High-level modules:
//! - `verify`: The gate itself (`verify_conditions`) and the run context.
//! - `lint`: The `Linter` seam plus the bundled policy linter.
//! - `checks`: Implementation of policy checks.
//! - `format`: The `Formatter` seam and the default message renderer.
//! - `logger`: The `Logger` capability and stock sinks.
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Messages, severities, policies, and run reports.
//! - `output`: Titles, color policy, and the JSON report.
//! - `error`: Error types surfaced to the host.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod lint;
pub mod logger;
pub mod models;
pub mod output;
pub mod utils;
pub mod verify;

pub use config::PluginConfig;
pub use error::{LintFailure, VerifyError, LINT_FAILURE_CODE};
pub use format::{DefaultFormatter, Formatter};
pub use lint::{Linter, PolicyLinter};
pub use logger::{Logger, MemoryLogger, StdoutLogger};
pub use models::{Message, Severity};
pub use verify::{verify_conditions, Context, ContextOptions};
