//! Human-readable rendering of linter messages.
//!
//! A formatter receives each message together with the parsed manifest so it
//! can quote the offending value. Returning an empty string suppresses the
//! message entirely: it is neither logged nor retained in failure details.

use crate::models::Message;
use owo_colors::OwoColorize;
use serde_json::Value as Json;
use std::collections::HashSet;

/// Values longer than this are truncated when quoted.
const MAX_VALUE_CHARS: usize = 60;

pub trait Formatter {
    fn format(&self, message: &Message, manifest: &Json) -> String;
}

impl<F: Fn(&Message, &Json) -> String> Formatter for F {
    fn format(&self, message: &Message, manifest: &Json) -> String {
        self(message, manifest)
    }
}

#[derive(Debug, Clone, Default)]
/// Renders `<text> (at pkg.<path>: <value>)`.
pub struct DefaultFormatter {
    pub color: bool,
    /// Message codes that are never shown.
    pub suppress: HashSet<String>,
}

impl DefaultFormatter {
    pub fn new(color: bool) -> Self {
        DefaultFormatter {
            color,
            suppress: HashSet::new(),
        }
    }

    pub fn suppressing<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suppress.extend(codes.into_iter().map(Into::into));
        self
    }
}

impl Formatter for DefaultFormatter {
    fn format(&self, message: &Message, manifest: &Json) -> String {
        if self.suppress.contains(&message.code) {
            return String::new();
        }
        let text = match message.args.get("message").and_then(Json::as_str) {
            Some(s) => s.to_string(),
            None => humanize_code(&message.code),
        };
        if message.path.is_empty() {
            return text;
        }
        let path = format_path(&message.path);
        let path = if self.color {
            path.bold().to_string()
        } else {
            path
        };
        match manifest_value(manifest, &message.path) {
            Some(v) => {
                let quoted = truncate(&compact(v), MAX_VALUE_CHARS);
                let quoted = if self.color {
                    quoted.cyan().to_string()
                } else {
                    quoted
                };
                format!("{} (at {}: {})", text, path, quoted)
            }
            None => format!("{} (at {})", text, path),
        }
    }
}

/// `FILE_DOES_NOT_EXIST` -> `File does not exist`.
pub fn humanize_code(code: &str) -> String {
    let lower = code.replace('_', " ").to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a message path as `pkg.exports["."].types`.
pub fn format_path(path: &[String]) -> String {
    let mut out = String::from("pkg");
    for seg in path {
        let plain = !seg.is_empty()
            && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            && !seg.chars().next().is_some_and(|c| c.is_ascii_digit());
        if plain {
            out.push('.');
            out.push_str(seg);
        } else if !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()) {
            out.push_str(&format!("[{}]", seg));
        } else {
            out.push_str(&format!("[{}]", Json::String(seg.clone())));
        }
    }
    out
}

/// Look up the manifest value at `path`. Numeric segments index arrays.
pub fn manifest_value<'a>(manifest: &'a Json, path: &[String]) -> Option<&'a Json> {
    let mut cur = manifest;
    for seg in path {
        cur = match cur {
            Json::Object(map) => map.get(seg)?,
            Json::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

fn compact(v: &Json) -> String {
    serde_json::to_string(v).unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…", head)
    }
}
