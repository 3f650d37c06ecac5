//! CLI entry point
//!
//! `run()` parses arguments, installs tracing, resolves the configuration on a
//! tokio runtime and handles all output, errors included.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use testrc_config::{TestConfiguration, WarningLog};
use testrc_utils::logging::init_tracing;
use testrc_utils::{ExitCode, TestrcError};

use super::args::Cli;

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after printing a user-facing report; `main` only
/// maps the code to a process exit.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {err}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("Failed to create async runtime: {err}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let (config, warnings) = match rt.block_on(resolve(&cli)) {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::debug!(error = %err, "Configuration resolution failed");
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    for message in warnings.messages() {
        eprintln!("Warning: {message}");
    }

    let printed = if cli.json {
        print_json(&config, &warnings)
    } else {
        print_table(&config);
        Ok(())
    };
    printed.map_err(|err| {
        eprintln!("Failed to print configuration: {err:#}");
        ExitCode::INTERNAL
    })
}

/// Run the full pipeline: init, prepare, validate, collect warnings.
async fn resolve(cli: &Cli) -> Result<(TestConfiguration, WarningLog), TestrcError> {
    let working_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let mut builder = TestConfiguration::builder().working_dir(working_dir);
    if let Some(path) = &cli.config {
        builder = builder.config_path(path);
    }
    let mut config = builder.build()?;

    config.init(Some(cli.runtime_options()?)).await?;
    config.prepare();
    config.validate()?;

    let mut warnings = WarningLog::new();
    config.notify_about_overridden_options(Some(&mut warnings));
    config.notify_about_deprecated_options(&mut warnings);

    Ok((config, warnings))
}

fn print_table(config: &TestConfiguration) {
    match config.file_path() {
        Some(path) => println!("Configuration file: {}", path.display()),
        None => println!("Configuration file: (none)"),
    }

    let effective = config.effective_options();
    let width = effective.keys().map(String::len).max().unwrap_or(0);
    println!("Effective options:");
    for (name, (value, source)) in &effective {
        println!("  {name:<width$}  {value}  [{source}]");
    }
}

fn print_json(config: &TestConfiguration, warnings: &WarningLog) -> Result<()> {
    let start_options = serde_json::to_value(config.start_options())
        .context("Failed to serialize start options")?;
    let report = json!({
        "configFile": config.file_path().map(|path| path.display().to_string()),
        "options": config.effective_options_json(),
        "startOptions": start_options,
        "warnings": warnings.messages(),
    });
    let rendered =
        serde_json::to_string_pretty(&report).context("Failed to serialize configuration")?;
    println!("{rendered}");
    Ok(())
}
