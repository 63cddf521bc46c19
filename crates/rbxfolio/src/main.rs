mod cli;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rbxfolio_core::{Aggregator, AggregatorConfig};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need upstream access
        Command::Config(ref args) => commands::config_cmd::handle(args, &cli.global),

        cmd => {
            let config = build_aggregator_config(&cli.global)?;
            let aggregator = Aggregator::connect(&config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &aggregator, &cli.global).await
        }
    }
}

/// Config file + environment, then CLI flag overrides.
fn build_aggregator_config(global: &GlobalOpts) -> Result<AggregatorConfig, CliError> {
    let cfg = rbxfolio_config::load_config(global.config.as_deref())?;
    let mut config = rbxfolio_config::to_aggregator_config(&cfg)?;

    if let Some(ownership) = global.ownership {
        config.ownership = ownership;
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "--timeout".into(),
                reason: "must be positive".into(),
            });
        }
        config.request_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}
