//! Configuration discovery and effective settings resolution.
//!
//! The gate reads `publint-gate.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `pkgDir`: the directory the gate runs in (`--repo-root` when given,
//!   otherwise the process's current directory)
//! - `strict`: false
//! - `output`: `human`
//! - `debug`: false
//! - `color`: auto (on unless `NO_COLOR` or JSON output)
//!
//! Keys under `[options]` are opaque and forwarded to the linter as-is.
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::utils::resolve_against;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["publint-gate.toml", "publint-gate.yaml", "publint-gate.yml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Per-run configuration handed to the verifier.
///
/// `pkgDir` and `strict` drive the gate. Every other key lands in `options`
/// and goes to the linter untouched.
pub struct PluginConfig {
    #[serde(rename = "pkgDir", default, skip_serializing_if = "Option::is_none")]
    pub pkg_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(flatten)]
    pub options: Map<String, Json>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `publint-gate.toml|yaml`.
pub struct FileConfig {
    #[serde(rename = "pkgDir")]
    pub pkg_dir: Option<String>,
    pub strict: Option<bool>,
    /// Host presentation setting; not part of the linter options.
    pub color: Option<bool>,
    pub output: Option<String>,
    pub debug: Option<bool>,
    /// Message codes the formatter hides.
    #[serde(default)]
    pub suppress: Vec<String>,
    #[serde(default)]
    pub options: Map<String, Json>,
}

#[derive(Debug, Default, Clone)]
/// Values supplied on the command line; `None` defers to the config file.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub pkg_dir: Option<String>,
    pub strict: Option<bool>,
    pub policy: Option<String>,
    pub level: Option<String>,
    pub output: Option<String>,
    pub debug: Option<bool>,
    pub color: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the host after applying precedence.
pub struct Effective {
    /// Where the gate runs; relative `pkgDir` resolves against it.
    pub cwd: PathBuf,
    /// Where config discovery stopped (config file or `.git`).
    pub repo_root: PathBuf,
    /// Path of the config file that was loaded, if any.
    pub config_file: Option<PathBuf>,
    pub plugin: PluginConfig,
    pub output: String,
    pub color: Option<bool>,
    pub debug: bool,
    pub suppress: Vec<String>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `publint-gate.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Locate the first config file present in `root`.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|f| root.join(f))
        .find(|p| p.is_file())
}

/// Load `FileConfig` from `root`, if a config file exists.
pub fn load_config(root: &Path) -> Result<Option<FileConfig>, ConfigError> {
    let Some(path) = find_config_file(root) else {
        return Ok(None);
    };
    let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let cfg: FileConfig = if is_toml {
        toml::from_str(&s).map_err(|source| ConfigError::Toml { path: path.clone(), source })?
    } else {
        serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml { path: path.clone(), source })?
    };
    Ok(Some(cfg))
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let start = resolve_against(&cwd, Path::new(cli.repo_root.as_deref().unwrap_or(".")));
    let repo_root = detect_repo_root(&start);
    let config_file = find_config_file(&repo_root);
    let cfg = load_config(&repo_root)?.unwrap_or_default();

    let mut options = cfg.options;
    // CLI conveniences for the bundled linter's options
    if let Some(policy) = cli.policy.as_ref() {
        options.insert("policy".into(), Json::String(policy.clone()));
    }
    if let Some(level) = cli.level.as_ref() {
        options.insert("level".into(), Json::String(level.clone()));
    }

    let plugin = PluginConfig {
        pkg_dir: cli.pkg_dir.clone().or(cfg.pkg_dir),
        strict: Some(cli.strict.or(cfg.strict).unwrap_or(false)),
        options,
    };
    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let debug = cli.debug.or(cfg.debug).unwrap_or(false);

    Ok(Effective {
        cwd: start,
        repo_root,
        config_file,
        plugin,
        output,
        color: cli.color.or(cfg.color),
        debug,
        suppress: cfg.suppress,
    })
}

/// Read the process-wide `DEBUG` toggle. Hosts call this once at startup and
/// thread the result into the run context.
pub fn debug_from_env() -> bool {
    std::env::var_os("DEBUG").is_some_and(|v| !v.is_empty())
}
