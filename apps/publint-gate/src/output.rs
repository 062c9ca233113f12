//! Output rendering for verification runs.
//!
//! Supports `human` (default) and `json` outputs. Human output is written
//! line by line through the run's logger while verifying; the JSON form is
//! composed once at the end from the run outcome.

use crate::error::VerifyError;
use crate::models::{Report, Severity};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

/// Decide whether to colorize. An explicit choice wins; otherwise colors
/// are on for human output unless `NO_COLOR` is set.
pub fn use_colors(explicit: Option<bool>, output: &str) -> bool {
    match explicit {
        Some(c) => c,
        None => output != "json" && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Line logged when the linter reports nothing.
pub fn success_line(color: bool) -> String {
    if color {
        "✓ no issues".green().to_string()
    } else {
        "✓ no issues".to_string()
    }
}

/// Title logged before each non-empty severity bucket.
pub fn bucket_title(severity: Severity, color: bool) -> String {
    let title = match severity {
        Severity::Suggestion => "Suggestions:",
        Severity::Warning => "Warnings:",
        Severity::Error => "Errors:",
    };
    if !color {
        return title.to_string();
    }
    match severity {
        Severity::Suggestion => title.bold().to_string(),
        Severity::Warning => title.yellow().bold().to_string(),
        Severity::Error => title.red().bold().to_string(),
    }
}

/// Compose the JSON document for a finished run (pure, for testing).
///
/// Collaborator failures have no JSON shape; callers report those directly.
pub fn compose_report_json(outcome: &Result<Report, VerifyError>) -> Option<JsonVal> {
    match outcome {
        Ok(report) => Some(json!({
            "passed": true,
            "summary": report.summary,
            "lines": report.lines,
        })),
        Err(VerifyError::Lint(failure)) => Some(json!({
            "passed": false,
            "summary": failure.report().summary,
            "failure": {
                "code": failure.code(),
                "message": failure.message(),
                "details": failure.details(),
            },
            "lines": failure.report().lines,
        })),
        Err(_) => None,
    }
}

/// Process exit code for a finished run: `0` continue, `1` lint failure,
/// `2` anything else.
pub fn exit_code(outcome: &Result<Report, VerifyError>) -> i32 {
    match outcome {
        Ok(_) => 0,
        Err(VerifyError::Lint(_)) => 1,
        Err(_) => 2,
    }
}
