//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "publint-gate",
    version,
    about = "Lint a package manifest as a release gate",
    long_about = "publint-gate — run a package linter before publishing and abort the release when it reports errors.\n\nConfiguration precedence: CLI > publint-gate.toml > defaults.",
    after_help = "Examples:\n  publint-gate verify\n  publint-gate verify --pkg-dir packages/core --strict\n  publint-gate verify --policy policy.toml --level warning --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current publint-gate version."
    )]
    Version,
    /// Verify release conditions
    #[command(
        about = "Run the release gate",
        long_about = "Lint the package and exit non-zero when errors (or warnings with --strict) are reported.\nExit codes: 0 continue, 1 lint failure, 2 configuration or linter failure.",
        after_help = "Examples:\n  publint-gate verify --strict\n  DEBUG=1 publint-gate verify --pkg-dir ./packages/ui"
    )]
    Verify {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Package directory, relative to the repository root")]
        pkg_dir: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Fail on warnings as well as errors")]
        strict: bool,
        #[arg(long, help = "Policy file for the bundled linter, relative to the package")]
        policy: Option<String>,
        #[arg(long, help = "Minimum reported level: suggestion|warning|error")]
        level: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Trace each step of the run")]
        debug: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable colored output")]
        no_color: bool,
    },
}

impl Commands {
    /// Flag values become overrides only when set, so config files can fill the rest.
    pub fn overrides(&self) -> Option<Overrides> {
        match self {
            Commands::Version => None,
            Commands::Verify {
                repo_root,
                pkg_dir,
                strict,
                policy,
                level,
                output,
                debug,
                no_color,
            } => Some(Overrides {
                repo_root: repo_root.clone(),
                pkg_dir: pkg_dir.clone(),
                strict: if *strict { Some(true) } else { None },
                policy: policy.clone(),
                level: level.clone(),
                output: output.clone(),
                debug: if *debug { Some(true) } else { None },
                color: if *no_color { Some(false) } else { None },
            }),
        }
    }
}
