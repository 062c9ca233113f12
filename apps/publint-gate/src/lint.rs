//! Linter seam and the bundled policy-driven linter.
//!
//! The verifier only sees `Linter`. `PolicyLinter` validates a package's
//! `package.json` against a TOML policy, honoring two forwarded options:
//! `policy` (path relative to the package dir; a built-in policy is used
//! when absent) and `level` (drop messages below this severity).

use crate::checks::{check_order, run_checks};
use crate::error::BoxError;
use crate::models::policy::Policy;
use crate::models::{LintRequest, Message, Severity};
use crate::verify::MANIFEST_FILE;
use serde_json::{Map, Value as Json};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A package linter the gate can run.
pub trait Linter {
    /// Name used in failure summaries, e.g. `publint`.
    fn name(&self) -> &str;
    fn lint(&self, request: &LintRequest) -> Result<Vec<Message>, BoxError>;
}

#[derive(Debug, Error)]
/// Failures of the policy linter. They reach the host unchanged.
pub enum PolicyError {
    #[error("package directory not found: {}", .0.display())]
    PackageDirNotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid JSON: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("policy file not found: {}", path.display())]
    PolicyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid policy: {source}", path.display())]
    PolicyParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("option `{key}` must be {expected}")]
    InvalidOption { key: String, expected: &'static str },
    #[error("invalid regex `{pattern}` for field `{field}`: {source}")]
    InvalidRegex {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyLinter;

impl Linter for PolicyLinter {
    fn name(&self) -> &str {
        "policy lint"
    }

    fn lint(&self, request: &LintRequest) -> Result<Vec<Message>, BoxError> {
        Ok(run_lint(&request.pkg_dir, &request.options)?)
    }
}

/// Lint `<pkg_dir>/package.json` against the configured policy.
///
/// Message order: checks in policy order, then the key-order message.
pub fn run_lint(pkg_dir: &Path, options: &Map<String, Json>) -> Result<Vec<Message>, PolicyError> {
    if !pkg_dir.is_dir() {
        return Err(PolicyError::PackageDirNotFound(pkg_dir.to_path_buf()));
    }
    let level = min_level(options)?;
    let policy = load_policy(pkg_dir, options)?;

    let manifest_path = pkg_dir.join(MANIFEST_FILE);
    let data = fs::read_to_string(&manifest_path).map_err(|source| PolicyError::ManifestRead {
        path: manifest_path.clone(),
        source,
    })?;
    let json: Json = serde_json::from_str(&data).map_err(|source| PolicyError::ManifestParse {
        path: manifest_path.clone(),
        source,
    })?;

    let mut messages = run_checks(&policy.checks, &json, pkg_dir)?;
    if let Some(ord) = policy.order.as_ref() {
        messages.extend(check_order(ord, &json));
    }
    let total = messages.len();
    messages.retain(|m| m.kind >= level);
    tracing::debug!(
        checks = policy.checks.len(),
        reported = total,
        kept = messages.len(),
        min_level = %level,
        "policy lint finished"
    );
    Ok(messages)
}

fn min_level(options: &Map<String, Json>) -> Result<Severity, PolicyError> {
    match options.get("level") {
        None | Some(Json::Null) => Ok(Severity::Suggestion),
        Some(Json::String(s)) => Severity::parse(s).ok_or(PolicyError::InvalidOption {
            key: "level".into(),
            expected: "one of suggestion, warning, error",
        }),
        Some(_) => Err(PolicyError::InvalidOption {
            key: "level".into(),
            expected: "a string",
        }),
    }
}

fn load_policy(pkg_dir: &Path, options: &Map<String, Json>) -> Result<Policy, PolicyError> {
    let rel = match options.get("policy") {
        None | Some(Json::Null) => {
            tracing::debug!("no policy option; using built-in policy");
            return Ok(Policy::builtin());
        }
        Some(Json::String(s)) => s,
        Some(_) => {
            return Err(PolicyError::InvalidOption {
                key: "policy".into(),
                expected: "a path string",
            })
        }
    };
    let path = crate::utils::resolve_against(pkg_dir, Path::new(rel));
    let src = fs::read_to_string(&path).map_err(|source| PolicyError::PolicyRead {
        path: path.clone(),
        source,
    })?;
    let policy: Policy = toml::from_str(&src).map_err(|source| PolicyError::PolicyParse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), checks = policy.checks.len(), "loaded policy");
    Ok(policy)
}
