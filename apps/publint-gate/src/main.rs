//! publint-gate CLI binary entry point.
//! Acts as the release host: resolves config, runs the gate, maps the
//! outcome to an exit code.

use clap::Parser;
use publint_gate::cli::{Cli, Commands};
use publint_gate::logger::{Logger, StderrLogger, StdoutLogger};
use publint_gate::utils::{display_relative, error_prefix, info_prefix, note_prefix};
use publint_gate::{config, output};
use publint_gate::{verify_conditions, Context, ContextOptions, DefaultFormatter, PolicyLinter, VerifyError};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let Some(overrides) = cli.cmd.overrides() else {
        if let Commands::Version = cli.cmd {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        return;
    };

    let eff = match config::resolve_effective(&overrides) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    };
    match eff.config_file.as_ref() {
        Some(file) if eff.debug => eprintln!(
            "{} {}",
            info_prefix(),
            format!("Using config {}", display_relative(file, &eff.repo_root))
        ),
        Some(_) => {}
        None => eprintln!(
            "{} {}",
            note_prefix(),
            "No publint-gate.toml found; using defaults."
        ),
    }

    let json_out = eff.output == "json";
    let color = output::use_colors(eff.color, &eff.output);

    // Keep stdout clean for the JSON document
    let logger: Box<dyn Logger> = if json_out {
        Box::new(StderrLogger)
    } else {
        Box::new(StdoutLogger)
    };
    let ctx = Context {
        logger,
        cwd: eff.cwd.clone(),
        options: ContextOptions {
            debug: eff.debug || config::debug_from_env(),
            color,
        },
    };
    let formatter = DefaultFormatter::new(color).suppressing(eff.suppress.iter().cloned());

    let outcome = verify_conditions(&eff.plugin, &ctx, &PolicyLinter, &formatter);

    if json_out {
        if let Some(doc) = output::compose_report_json(&outcome) {
            match serde_json::to_string_pretty(&doc) {
                Ok(s) => println!("{}", s),
                Err(e) => eprintln!("{} {}", error_prefix(), e),
            }
        }
    }

    match &outcome {
        Ok(_) => {}
        Err(VerifyError::Lint(failure)) => {
            if !json_out {
                eprintln!("{} {} [{}]", error_prefix(), failure.message(), failure.code());
            }
        }
        Err(e) => eprintln!("{} {}", error_prefix(), e),
    }
    let code = output::exit_code(&outcome);
    if code != 0 {
        std::process::exit(code);
    }
}
