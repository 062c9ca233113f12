//! Policy schema used by the bundled policy linter.
//!
//! Key components:
//! - `checks`: Validation rules (required/type/const/pattern/enum/length/exists).
//! - `order`: Declares top-level key groups plus the `message` and `level`
//!   reported when the manifest's key order differs.
//!
//! Every check accepts an optional `message` override and a `level`
//! (`suggestion|info`, `warning|warn`, `error`). Checks default to `error`,
//! the order check to `suggestion`.

use crate::models::Severity;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
/// Root policy loaded from a TOML file.
pub struct Policy {
    #[serde(default)]
    pub checks: Vec<Check>,
    #[serde(default)]
    pub order: Option<OrderSpec>,
}

impl Policy {
    /// Policy used when no `policy` option is supplied: a manifest must at
    /// least name and version the package.
    pub fn builtin() -> Policy {
        Policy {
            checks: vec![
                Check::Required {
                    fields: vec!["name".into(), "version".into()],
                    message: None,
                    level: None,
                },
                Check::Type {
                    fields: BTreeMap::from([
                        ("name".to_string(), "string".to_string()),
                        ("version".to_string(), "string".to_string()),
                    ]),
                    message: None,
                    level: None,
                },
            ],
            order: None,
        }
    }
}

/// Expected grouping of top-level manifest keys.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct OrderSpec {
    pub top: Vec<Vec<String>>,
    pub message: Option<String>,
    pub level: Option<Severity>,
}

/// One rule of a policy, selected by its `kind` key.
///
/// Each variant notes the message code it reports. `message` replaces the
/// generated text; `level` replaces the default `error`.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Check {
    /// `FIELD_REQUIRED` for each listed field that is absent or null.
    Required {
        fields: Vec<String>,
        message: Option<String>,
        level: Option<Severity>,
    },
    /// `FIELD_INVALID_TYPE`. Keys are field paths, values one of `string`,
    /// `number`, `integer`, `boolean`, `array`, `object`, `null`.
    Type {
        #[serde(default)]
        fields: BTreeMap<String, String>,
        message: Option<String>,
        level: Option<Severity>,
    },
    /// `FIELD_INVALID_VALUE`
    Const {
        field: String,
        value: Json,
        message: Option<String>,
        level: Option<Severity>,
    },
    /// `FIELD_PATTERN_MISMATCH`; only string values are matched.
    Pattern {
        field: String,
        regex: String,
        message: Option<String>,
        level: Option<Severity>,
    },
    /// `FIELD_NOT_IN_ENUM`
    Enum {
        field: String,
        values: Vec<Json>,
        message: Option<String>,
        level: Option<Severity>,
    },
    MinLength {
        field: String,
        min: usize,
        message: Option<String>,
        level: Option<Severity>,
    },
    MaxLength {
        field: String,
        max: usize,
        message: Option<String>,
        level: Option<Severity>,
    },
    /// Fields naming files inside the package. Reports `FILE_DOES_NOT_EXIST`,
    /// or `FILE_OUTSIDE_PACKAGE` when the path leaves the package dir.
    Exists {
        fields: Vec<String>,
        message: Option<String>,
        level: Option<Severity>,
    },
}
