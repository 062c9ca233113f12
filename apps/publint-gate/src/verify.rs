//! Condition verification: the release gate itself.
//!
//! A run resolves the package directory, asks the linter for messages,
//! logs them bucketed by severity, and fails when errors were reported (or
//! warnings, in strict mode). Linter and manifest failures are returned
//! untouched.

use crate::config::PluginConfig;
use crate::error::{LintFailure, VerifyError};
use crate::format::Formatter;
use crate::lint::Linter;
use crate::logger::{Logger, StdoutLogger};
use crate::models::{LintRequest, Message, Report, Severity, Summary};
use crate::output::{bucket_title, success_line};
use crate::utils::{display_relative, resolve_against};
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextOptions {
    /// Emit trace lines around each step. Resolved once by the host.
    pub debug: bool,
    /// Colorize titles and the success line.
    pub color: bool,
}

/// What the host supplies for one run.
pub struct Context {
    pub logger: Box<dyn Logger>,
    pub cwd: PathBuf,
    pub options: ContextOptions,
}

impl Context {
    pub fn new(logger: impl Logger + 'static, cwd: impl Into<PathBuf>) -> Self {
        Context {
            logger: Box::new(logger),
            cwd: cwd.into(),
            options: ContextOptions::default(),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }
}

impl Default for Context {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Context::new(StdoutLogger, cwd)
    }
}

/// Messages split by severity, each bucket in the linter's order.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub suggestions: Vec<&'a Message>,
    pub warnings: Vec<&'a Message>,
    pub errors: Vec<&'a Message>,
}

impl<'a> Partition<'a> {
    pub fn of(messages: &'a [Message]) -> Self {
        let mut p = Partition::default();
        for m in messages {
            match m.kind {
                Severity::Suggestion => p.suggestions.push(m),
                Severity::Warning => p.warnings.push(m),
                Severity::Error => p.errors.push(m),
            }
        }
        p
    }

    pub fn bucket(&self, severity: Severity) -> &[&'a Message] {
        match severity {
            Severity::Suggestion => &self.suggestions,
            Severity::Warning => &self.warnings,
            Severity::Error => &self.errors,
        }
    }

    pub fn should_fail(&self, strict: bool) -> bool {
        !self.errors.is_empty() || (strict && !self.warnings.is_empty())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            suggestions: self.suggestions.len(),
            warnings: self.warnings.len(),
            errors: self.errors.len(),
        }
    }
}

/// Resolve the directory to lint. Relative `pkg_dir` is taken against `cwd`.
pub fn resolve_package_dir(cwd: &Path, pkg_dir: Option<&str>) -> PathBuf {
    match pkg_dir {
        Some(dir) if !dir.is_empty() => resolve_against(cwd, Path::new(dir)),
        _ => cwd.to_path_buf(),
    }
}

/// Run the gate once.
///
/// Returns `Ok` when the release may continue, including runs that only
/// logged suggestions or (outside strict mode) warnings. Returns
/// `VerifyError::Lint` when the thresholds are exceeded; any other error
/// comes straight from the linter or the manifest read.
pub fn verify_conditions(
    config: &PluginConfig,
    ctx: &Context,
    linter: &dyn Linter,
    formatter: &dyn Formatter,
) -> Result<Report, VerifyError> {
    let logger = ctx.logger.as_ref();
    let debug = ctx.options.debug;

    if debug {
        let echo = serde_json::to_string(config).unwrap_or_default();
        logger.log(&format!("Running {} with config {}", linter.name(), echo));
    }

    let package_dir = resolve_package_dir(&ctx.cwd, config.pkg_dir.as_deref());
    let manifest_path = package_dir.join(MANIFEST_FILE);

    if debug {
        logger.log(&format!(
            "running {} on {}",
            linter.name(),
            display_relative(&manifest_path, &ctx.cwd)
        ));
    }

    let request = LintRequest {
        pkg_dir: package_dir,
        options: config.options.clone(),
    };
    let messages = linter.lint(&request).map_err(VerifyError::Linter)?;

    if debug {
        logger.log(&format!("{} completed", linter.name()));
    }

    let color = ctx.options.color;
    if messages.is_empty() {
        logger.log(&success_line(color));
        return Ok(Report {
            summary: Summary::default(),
            lines: Vec::new(),
        });
    }

    if debug {
        logger.log(&format!(
            "reading and parsing {} contents",
            manifest_path.display()
        ));
    }
    let manifest = read_manifest(&manifest_path)?;
    if debug {
        logger.log("read and parsed");
    }

    let partition = Partition::of(&messages);
    let mut lines: Vec<String> = Vec::new();
    for severity in [Severity::Suggestion, Severity::Warning, Severity::Error] {
        let bucket = partition.bucket(severity);
        if bucket.is_empty() {
            continue;
        }
        let title = bucket_title(severity, color);
        logger.log(&title);
        lines.push(title);
        for message in bucket {
            let text = formatter.format(message, &manifest);
            if text.is_empty() {
                continue;
            }
            let line = format!("  {}", text);
            logger.log(&line);
            lines.push(line);
        }
    }

    let summary = partition.summary();
    if partition.should_fail(config.strict.unwrap_or(false)) {
        let message = format!(
            "{} reported {} errors and {} warnings",
            linter.name(),
            summary.errors,
            summary.warnings
        );
        if debug {
            logger.log(&format!("{}, failing", message));
        }
        return Err(LintFailure::new(message, Report { summary, lines }).into());
    }

    Ok(Report { summary, lines })
}

fn read_manifest(path: &Path) -> Result<Json, VerifyError> {
    let data = fs::read_to_string(path).map_err(|source| VerifyError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| VerifyError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::format::DefaultFormatter;
    use crate::lint::PolicyLinter;
    use crate::logger::MemoryLogger;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct StubLinter {
        messages: Vec<Message>,
        seen: RefCell<Vec<LintRequest>>,
    }

    impl StubLinter {
        fn new(messages: Vec<Message>) -> Self {
            StubLinter {
                messages,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Linter for StubLinter {
        fn name(&self) -> &str {
            "publint"
        }

        fn lint(&self, request: &LintRequest) -> Result<Vec<Message>, BoxError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.messages.clone())
        }
    }

    struct FailingLinter;

    impl Linter for FailingLinter {
        fn name(&self) -> &str {
            "publint"
        }

        fn lint(&self, request: &LintRequest) -> Result<Vec<Message>, BoxError> {
            Err(format!("no such directory: {}", request.pkg_dir.display()).into())
        }
    }

    fn code_only(m: &Message, _manifest: &Json) -> String {
        m.code.clone()
    }

    fn plain() -> PluginConfig {
        PluginConfig::default()
    }

    fn strict() -> PluginConfig {
        PluginConfig {
            strict: Some(true),
            ..plain()
        }
    }

    fn write_manifest(dir: &Path) {
        fs::write(dir.join("package.json"), r#"{"name":"demo","version":"1.0.0"}"#).unwrap();
    }

    fn msg(code: &str, kind: Severity) -> Message {
        Message::new(code, kind)
    }

    #[test]
    fn test_empty_messages_log_success_without_reading_manifest() {
        let dir = tempdir().unwrap();
        // Corrupt manifest must not matter on the empty path
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path());
        let report = verify_conditions(&plain(), &ctx, &StubLinter::new(vec![]), &code_only).unwrap();
        assert_eq!(report.summary, Summary::default());
        assert_eq!(log.lines(), vec!["✓ no issues"]);
    }

    #[test]
    fn test_single_error_fails_with_exact_counts() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path());
        let linter = StubLinter::new(vec![msg("FILE_DOES_NOT_EXIST", Severity::Error)]);
        let err = verify_conditions(&plain(), &ctx, &linter, &code_only).unwrap_err();
        match err {
            VerifyError::Lint(f) => {
                assert_eq!(f.message(), "publint reported 1 errors and 0 warnings");
                assert_eq!(f.code(), "EPUBLINT");
                assert_eq!(f.details(), "Errors:\n  FILE_DOES_NOT_EXIST");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(log.lines(), vec!["Errors:", "  FILE_DOES_NOT_EXIST"]);
    }

    #[test]
    fn test_warning_passes_unless_strict() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let linter = StubLinter::new(vec![msg("W1", Severity::Warning)]);

        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path());
        let report = verify_conditions(&plain(), &ctx, &linter, &code_only).unwrap();
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(log.lines(), vec!["Warnings:", "  W1"]);

        let ctx = Context::new(MemoryLogger::new(), dir.path());
        let err = verify_conditions(&strict(), &ctx, &linter, &code_only).unwrap_err();
        assert_eq!(err.to_string(), "publint reported 0 errors and 1 warnings");
    }

    #[test]
    fn test_suggestions_never_fail_even_in_strict_mode() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let linter = StubLinter::new(vec![msg("S1", Severity::Suggestion)]);
        let ctx = Context::new(MemoryLogger::new(), dir.path());
        assert!(verify_conditions(&strict(), &ctx, &linter, &code_only).is_ok());
    }

    #[test]
    fn test_relative_pkg_dir_resolves_against_context_cwd() {
        let dir = tempdir().unwrap();
        let linter = StubLinter::new(vec![]);
        let config = PluginConfig {
            pkg_dir: Some("./packages/a".into()),
            ..plain()
        };
        let ctx = Context::new(MemoryLogger::new(), dir.path());
        verify_conditions(&config, &ctx, &linter, &code_only).unwrap();
        let seen = linter.seen.borrow();
        assert_eq!(seen[0].pkg_dir, dir.path().join("packages").join("a"));
    }

    #[test]
    fn test_absolute_pkg_dir_passes_through() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let linter = StubLinter::new(vec![]);
        let config = PluginConfig {
            pkg_dir: Some(other.path().to_string_lossy().to_string()),
            ..plain()
        };
        let ctx = Context::new(MemoryLogger::new(), dir.path());
        verify_conditions(&config, &ctx, &linter, &code_only).unwrap();
        assert_eq!(linter.seen.borrow()[0].pkg_dir, other.path());
    }

    #[test]
    fn test_everything_but_pkg_dir_and_strict_is_forwarded() {
        let dir = tempdir().unwrap();
        let config: PluginConfig = serde_json::from_str(
            r#"{"pkgDir":"pkg","strict":true,"color":false,"level":"warning","policy":"p.toml"}"#,
        )
        .unwrap();
        let linter = StubLinter::new(vec![]);
        let ctx = Context::new(MemoryLogger::new(), dir.path());
        verify_conditions(&config, &ctx, &linter, &code_only).unwrap();
        let seen = linter.seen.borrow();
        let keys: Vec<&str> = seen[0].options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["color", "level", "policy"]);
        assert_eq!(seen[0].pkg_dir, dir.path().join("pkg"));
    }

    #[test]
    fn test_buckets_are_logged_in_fixed_order_preserving_linter_order() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let linter = StubLinter::new(vec![
            msg("E1", Severity::Error),
            msg("S1", Severity::Suggestion),
            msg("W1", Severity::Warning),
            msg("E2", Severity::Error),
            msg("S2", Severity::Suggestion),
        ]);
        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path());
        let err = verify_conditions(&plain(), &ctx, &linter, &code_only).unwrap_err();
        let expected = vec![
            "Suggestions:",
            "  S1",
            "  S2",
            "Warnings:",
            "  W1",
            "Errors:",
            "  E1",
            "  E2",
        ];
        assert_eq!(log.lines(), expected);
        match err {
            VerifyError::Lint(f) => {
                assert_eq!(f.message(), "publint reported 2 errors and 1 warnings");
                assert_eq!(f.details(), expected.join("\n"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_suppressed_messages_are_not_logged_or_retained() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let linter = StubLinter::new(vec![
            msg("KEEP", Severity::Error),
            msg("HIDE", Severity::Error),
        ]);
        let formatter = DefaultFormatter::new(false).suppressing(["HIDE"]);
        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path());
        let err = verify_conditions(&plain(), &ctx, &linter, &formatter).unwrap_err();
        assert_eq!(log.lines(), vec!["Errors:", "  Keep"]);
        match err {
            // Suppressed messages still count toward the decision
            VerifyError::Lint(f) => {
                assert_eq!(f.message(), "publint reported 2 errors and 0 warnings");
                assert_eq!(f.details(), "Errors:\n  Keep");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_linter_failure_propagates_unchanged() {
        let dir = tempdir().unwrap();
        let ctx = Context::new(MemoryLogger::new(), dir.path().join("missing"));
        let err = verify_conditions(&plain(), &ctx, &FailingLinter, &code_only).unwrap_err();
        assert!(matches!(err, VerifyError::Linter(_)));
        assert!(err.to_string().starts_with("no such directory:"));
    }

    #[test]
    fn test_manifest_failures_surface_when_messages_exist() {
        let dir = tempdir().unwrap();
        let linter = StubLinter::new(vec![msg("S1", Severity::Suggestion)]);
        let ctx = Context::new(MemoryLogger::new(), dir.path());
        let err = verify_conditions(&plain(), &ctx, &linter, &code_only).unwrap_err();
        assert!(matches!(err, VerifyError::ManifestRead { .. }));

        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let err = verify_conditions(&plain(), &ctx, &linter, &code_only).unwrap_err();
        assert!(matches!(err, VerifyError::ManifestParse { .. }));
    }

    #[test]
    fn test_debug_traces_do_not_change_the_decision() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let linter = StubLinter::new(vec![msg("E1", Severity::Error)]);
        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path()).with_debug(true);
        let err = verify_conditions(&plain(), &ctx, &linter, &code_only).unwrap_err();
        assert!(err.is_lint_failure());
        let lines = log.lines();
        assert!(lines[0].starts_with("Running publint with config {"));
        assert!(lines[1].starts_with("running publint on "));
        assert_eq!(lines[2], "publint completed");
        assert!(lines[3].starts_with("reading and parsing "));
        assert_eq!(lines[4], "read and parsed");
        assert_eq!(
            lines.last().unwrap(),
            "publint reported 1 errors and 0 warnings, failing"
        );
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());
        let linter = StubLinter::new(vec![
            msg("W1", Severity::Warning),
            msg("S1", Severity::Suggestion),
        ]);
        let run = || {
            let ctx = Context::new(MemoryLogger::new(), dir.path());
            verify_conditions(&plain(), &ctx, &linter, &code_only).unwrap()
        };
        assert_eq!(run(), run());
    }

    fn missing_files_fixture(dir: &Path) {
        fs::write(
            dir.join("package.json"),
            r#"{"name":"missing-files","version":"1.0.0","main":"./lib/index.js"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("policy.toml"),
            "[[checks]]\nkind = \"exists\"\nfields = [\"main\"]\n",
        )
        .unwrap();
    }

    fn policy_options() -> PluginConfig {
        serde_json::from_str(r#"{"policy":"policy.toml"}"#).unwrap()
    }

    #[test]
    fn test_policy_linter_fails_on_missing_files() {
        let dir = tempdir().unwrap();
        missing_files_fixture(dir.path());
        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path());
        let formatter = DefaultFormatter::new(false);
        let err = verify_conditions(&policy_options(), &ctx, &PolicyLinter, &formatter).unwrap_err();
        match err {
            VerifyError::Lint(f) => {
                assert_eq!(f.message(), "policy lint reported 1 errors and 0 warnings");
                assert_eq!(f.report().summary.errors, 1);
                assert!(f
                    .details()
                    .starts_with("Errors:\n  `main` points to ./lib/index.js which does not exist (at pkg.main"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(log.lines().len(), 2);
    }

    #[test]
    fn test_policy_linter_passes_complete_package() {
        let dir = tempdir().unwrap();
        missing_files_fixture(dir.path());
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib").join("index.js"), "module.exports = {};\n").unwrap();
        let log = MemoryLogger::new();
        let ctx = Context::new(log.clone(), dir.path());
        let formatter = DefaultFormatter::new(false);
        let report = verify_conditions(&policy_options(), &ctx, &PolicyLinter, &formatter).unwrap();
        assert_eq!(report.summary, Summary::default());
        assert_eq!(log.lines(), vec!["✓ no issues"]);
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let messages = vec![
            msg("a", Severity::Warning),
            msg("b", Severity::Error),
            msg("c", Severity::Suggestion),
            msg("d", Severity::Warning),
        ];
        let p = Partition::of(&messages);
        let s = p.summary();
        assert_eq!(s.suggestions + s.warnings + s.errors, messages.len());
        assert_eq!(p.warnings.iter().map(|m| m.code.as_str()).collect::<Vec<_>>(), ["a", "d"]);
        assert!(p.should_fail(false));
        let only_warn = vec![msg("w", Severity::Warning)];
        let p = Partition::of(&only_warn);
        assert!(!p.should_fail(false));
        assert!(p.should_fail(true));
    }
}
