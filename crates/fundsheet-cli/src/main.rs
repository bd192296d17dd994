mod cli;
mod commands;
mod error;
mod menu;
mod output;

use std::process::ExitCode;

use clap::Parser;
use fundsheet_core::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(exit_code = error.exit_code(), "{error}");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let log_level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    init_tracing(log_level);

    let command = match cli.command.clone() {
        Some(command) => command,
        None => menu::prompt().await?,
    };

    let context = commands::AppContext::build(settings, cli.dry_run)?;
    commands::run(&command, &context, cli.format).await
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
