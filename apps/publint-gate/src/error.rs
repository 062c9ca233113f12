//! Error types surfaced to the release host.
//!
//! `LintFailure` is the only error the verifier manufactures. Everything
//! else is a collaborator failure and keeps the collaborator's own message
//! and source chain.

use crate::models::Report;
use std::path::PathBuf;
use thiserror::Error;

/// Stable code attached to lint-threshold failures.
pub const LINT_FAILURE_CODE: &str = "EPUBLINT";

/// Boxed error returned by linter implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
/// Raised when reported errors (or warnings in strict mode) exceed the gate.
///
/// Carries the run's report so hosts can still show counts and lines.
pub struct LintFailure {
    message: String,
    code: &'static str,
    details: String,
    report: Report,
}

impl LintFailure {
    pub fn new(message: String, report: Report) -> Self {
        LintFailure {
            message,
            code: LINT_FAILURE_CODE,
            details: report.lines.join("\n"),
            report,
        }
    }

    /// Short summary, e.g. `publint reported 1 errors and 0 warnings`.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        self.code
    }

    /// Every retained log line, newline-joined.
    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn report(&self) -> &Report {
        &self.report
    }
}

#[derive(Debug, Error)]
/// Failure of a verification run.
pub enum VerifyError {
    #[error(transparent)]
    Lint(#[from] LintFailure),
    #[error(transparent)]
    Linter(BoxError),
    #[error("failed to read {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl VerifyError {
    pub fn is_lint_failure(&self) -> bool {
        matches!(self, VerifyError::Lint(_))
    }

    /// Stable code, present only for failures the gate itself raises.
    pub fn code(&self) -> Option<&str> {
        match self {
            VerifyError::Lint(f) => Some(f.code()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
/// Configuration discovery or parsing failure.
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid TOML: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{} is not valid YAML: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
