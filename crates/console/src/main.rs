//! `cadmin` -- admin console for the student-certification backend.
//!
//! Configuration comes from the environment (and `.env`); see
//! [`ConsoleConfig::from_env`] for the variables. Logs go to stderr,
//! filtered by `RUST_LOG`.

use std::process::ExitCode;

use anyhow::Context;
use cadmin_console::cli::Cli;
use cadmin_console::commands::App;
use cadmin_console::config::ConsoleConfig;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadmin_console=info,cadmin_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ConsoleConfig::from_env().context("invalid configuration")?;
    let catalog = config.load_catalog().context("cannot load course catalog")?;
    tracing::debug!(backend_url = %config.backend_url, "Configuration loaded");

    let app = App::new(config, catalog);
    match app.run(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
