//! dmnx - command-line DMN executor
//!
//! Prints exactly one JSON document on stdout per invocation. Logs go to stderr.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use dmnx_sdk::output::failure_document;
use dmnx_sdk::{Executor, ExecutorConfig, Outcome, SdkError, EXIT_FAILURE, EXIT_SUCCESS};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Commands};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return usage_error(e),
    };

    let (config, config_error) = match ExecutorConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (ExecutorConfig::default(), Some(e)),
    };
    if let Err(e) = init_tracing(&config.log_level, cli.verbose) {
        eprintln!("{:#}", e);
    }
    if let Some(e) = config_error {
        tracing::warn!("Ignoring configuration ({}), using defaults", e);
    }

    let executor = Executor::new(config);
    let outcome = match cli.command.args().to_options(executor.config()) {
        Ok(options) => {
            tracing::debug!(?options, "run options");
            match &cli.command {
                Commands::Execute(_) => executor.execute(&options),
                Commands::Service(_) => executor.service(&options),
                Commands::Info(_) => executor.info(&options),
            }
        }
        Err(e) => Outcome::failure(&SdkError::Io(e)),
    };

    println!("{}", outcome.render());
    outcome.exit_code
}

/// Help and version go to the terminal as usual; anything else is a failure document
fn usage_error(e: clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            EXIT_SUCCESS
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = e.print();
            EXIT_FAILURE
        }
        _ => {
            let rendered = e.render().to_string();
            let message = rendered
                .lines()
                .take_while(|line| !line.starts_with("Usage:"))
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let document = failure_document(vec![message.trim_start_matches("error: ").to_string()]);
            println!(
                "{}",
                serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string())
            );
            EXIT_FAILURE
        }
    }
}

/// Initialize tracing subscriber on stderr
fn init_tracing(default_level: &str, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => default_level,
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
