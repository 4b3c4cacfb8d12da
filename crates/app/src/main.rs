//! Cinema - reservation client
//!
//! Command-line client for browsing screenings and booking seats against
//! the cinema REST backend.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod flow;
mod session;
mod state;
#[cfg(test)]
mod testing;
mod viewmodel;

use commands::Command;
use config::AppConfig;
use flow::FlowScope;

#[derive(Parser)]
#[command(name = "cinema", version, about, long_about = None)]
struct Cli {
    /// Config file; defaults to cinema.toml in the platform config dir
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let listing = cli.command.listing();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match state::AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let scope = FlowScope::new();
    let result = runtime.block_on(async {
        let canceller = scope.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                canceller.cancel();
            }
        });

        commands::run(&app_state, cli.command, scope).await
    });

    if let Err(e) = result {
        eprintln!("error: {}", viewmodel::failure_message(&e));
        if let Some(hint) = commands::failure_hint(&e, listing) {
            eprintln!("hint: {}", hint);
        }
        std::process::exit(1);
    }
}
