//! Implementation of policy checks against a parsed manifest.
//!
//! Field names are dot-separated paths (`repository.url`). Checks other than
//! `required` skip fields that are absent.

use crate::format::manifest_value;
use crate::lint::PolicyError;
use crate::models::policy::{Check, OrderSpec};
use crate::models::{Message, Severity};
use crate::utils::resolve_against;
use regex::Regex;
use serde_json::Value as Json;
use std::path::Path;

/// Run every check in order, collecting messages.
pub fn run_checks(checks: &[Check], json: &Json, pkg_dir: &Path) -> Result<Vec<Message>, PolicyError> {
    let mut out = Vec::new();
    for check in checks {
        match check {
            Check::Required { fields, message, level } => {
                for field in fields {
                    let path = split_field(field);
                    if matches!(manifest_value(json, &path), None | Some(Json::Null)) {
                        out.push(issue(
                            "FIELD_REQUIRED",
                            *level,
                            path,
                            message,
                            format!("`{}` is required", field),
                        ));
                    }
                }
            }
            Check::Type { fields, message, level } => {
                for (field, expected) in fields {
                    let path = split_field(field);
                    let Some(v) = manifest_value(json, &path) else {
                        continue;
                    };
                    if !kind_matches(v, expected) {
                        out.push(issue(
                            "FIELD_INVALID_TYPE",
                            *level,
                            path,
                            message,
                            format!("`{}` should be {} but is {}", field, expected, kind_of(v)),
                        ));
                    }
                }
            }
            Check::Const { field, value, message, level } => {
                let path = split_field(field);
                if let Some(v) = manifest_value(json, &path) {
                    if v != value {
                        out.push(issue(
                            "FIELD_INVALID_VALUE",
                            *level,
                            path,
                            message,
                            format!("`{}` should be {}", field, value),
                        ));
                    }
                }
            }
            Check::Pattern { field, regex, message, level } => {
                let re = Regex::new(regex).map_err(|source| PolicyError::InvalidRegex {
                    field: field.clone(),
                    pattern: regex.clone(),
                    source,
                })?;
                let path = split_field(field);
                if let Some(Json::String(s)) = manifest_value(json, &path) {
                    if !re.is_match(s) {
                        out.push(issue(
                            "FIELD_PATTERN_MISMATCH",
                            *level,
                            path,
                            message,
                            format!("`{}` does not match /{}/", field, regex),
                        ));
                    }
                }
            }
            Check::Enum { field, values, message, level } => {
                let path = split_field(field);
                if let Some(v) = manifest_value(json, &path) {
                    if !values.contains(v) {
                        let allowed: Vec<String> = values.iter().map(|x| x.to_string()).collect();
                        out.push(issue(
                            "FIELD_NOT_IN_ENUM",
                            *level,
                            path,
                            message,
                            format!("`{}` should be one of [{}]", field, allowed.join(", ")),
                        ));
                    }
                }
            }
            Check::MinLength { field, min, message, level } => {
                let path = split_field(field);
                if let Some(len) = manifest_value(json, &path).and_then(length_of) {
                    if len < *min {
                        out.push(issue(
                            "FIELD_TOO_SHORT",
                            *level,
                            path,
                            message,
                            format!("`{}` should have a length of at least {}", field, min),
                        ));
                    }
                }
            }
            Check::MaxLength { field, max, message, level } => {
                let path = split_field(field);
                if let Some(len) = manifest_value(json, &path).and_then(length_of) {
                    if len > *max {
                        out.push(issue(
                            "FIELD_TOO_LONG",
                            *level,
                            path,
                            message,
                            format!("`{}` should have a length of at most {}", field, max),
                        ));
                    }
                }
            }
            Check::Exists { fields, message, level } => {
                let root = resolve_against(pkg_dir, Path::new("."));
                for field in fields {
                    let path = split_field(field);
                    let Some(Json::String(rel)) = manifest_value(json, &path) else {
                        continue;
                    };
                    let target = resolve_against(&root, Path::new(rel));
                    if !target.starts_with(&root) {
                        out.push(issue(
                            "FILE_OUTSIDE_PACKAGE",
                            *level,
                            path,
                            message,
                            format!("`{}` points to {} which is outside the package", field, rel),
                        ));
                    } else if !target.exists() {
                        out.push(issue(
                            "FILE_DOES_NOT_EXIST",
                            *level,
                            path,
                            message,
                            format!("`{}` points to {} which does not exist", field, rel),
                        ));
                    }
                }
            }
        }
    }
    Ok(out)
}

/// Compare top-level key order with the policy's groups. Keys not named by
/// any group are expected after them, sorted.
pub fn check_order(ord: &OrderSpec, json: &Json) -> Option<Message> {
    let Json::Object(obj) = json else {
        return None;
    };
    let actual: Vec<&String> = obj.keys().collect();
    let mut expected: Vec<&String> = Vec::new();
    for group in &ord.top {
        for key in group {
            if let Some(k) = obj.keys().find(|k| *k == key) {
                if !expected.contains(&k) {
                    expected.push(k);
                }
            }
        }
    }
    let mut rest: Vec<&String> = obj.keys().filter(|k| !expected.contains(k)).collect();
    rest.sort();
    expected.extend(rest);
    if expected == actual {
        return None;
    }
    let text = ord
        .message
        .clone()
        .unwrap_or_else(|| "Top-level key order does not match policy".to_string());
    Some(
        Message::new("KEY_ORDER", ord.level.unwrap_or(Severity::Suggestion))
            .with_arg("message", text),
    )
}

fn issue(
    code: &str,
    level: Option<Severity>,
    path: Vec<String>,
    message: &Option<String>,
    default_text: String,
) -> Message {
    let mut m = Message::new(code, level.unwrap_or(Severity::Error));
    m.path = path;
    m.with_arg("message", message.clone().unwrap_or(default_text))
}

fn split_field(field: &str) -> Vec<String> {
    field
        .trim_start_matches("$.")
        .split('.')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn kind_of(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn kind_matches(v: &Json, expected: &str) -> bool {
    match expected {
        "number" => v.is_number(),
        other => kind_of(v) == other,
    }
}

fn length_of(v: &Json) -> Option<usize> {
    match v {
        Json::String(s) => Some(s.chars().count()),
        Json::Array(a) => Some(a.len()),
        _ => None,
    }
}
