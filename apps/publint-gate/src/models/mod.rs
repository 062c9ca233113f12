//! Shared data models for linter messages, policies, and run reports.

pub mod policy;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Severity of a linter message. Ordered from least to most severe.
pub enum Severity {
    #[serde(alias = "info")]
    Suggestion,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Suggestion => "suggestion",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Parse a level name, accepting the `info`/`warn` aliases used in policies.
    pub fn parse(s: &str) -> Option<Severity> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suggestion" | "info" => Some(Severity::Suggestion),
            "warning" | "warn" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single diagnostic reported by a linter.
///
/// Only `kind` is interpreted by the verifier. `code`, `path` and `args`
/// are passed through to the formatter untouched.
pub struct Message {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: Severity,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub args: Map<String, Json>,
}

impl Message {
    pub fn new(code: impl Into<String>, kind: Severity) -> Self {
        Message {
            code: code.into(),
            kind,
            path: Vec::new(),
            args: Map::new(),
        }
    }

    pub fn at(mut self, path: &[&str]) -> Self {
        self.path = path.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_arg(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
/// Input handed to a linter: the resolved package directory plus the
/// caller's options, forwarded verbatim.
pub struct LintRequest {
    pub pkg_dir: PathBuf,
    pub options: Map<String, Json>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Per-severity counts for a run.
pub struct Summary {
    pub suggestions: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of a verification that did not abort the release.
pub struct Report {
    pub summary: Summary,
    /// Bucket titles and formatted lines, in emission order.
    pub lines: Vec<String>,
}
