//! Placement Portal command-line client

mod cli;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use placement_portal::{
    backend::create_backend, config::Config, services::SessionManager, store::create_store,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load configuration
    let config = Config::load_with_env(&args.config)?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Using API at {}", config.api.base_url);

    let store = create_store(&config.credentials);
    let backend = create_backend(&config.api)?;
    let sessions = Arc::new(SessionManager::new(backend.clone(), store));

    // Guards must not decide before a stored session is validated
    if sessions.state().is_restoring() {
        sessions.restore_session().await;
    }

    let app = cli::App::new(backend, sessions);
    if let Err(e) = app.run(args.command).await {
        tracing::debug!("Command failed: {} ({})", e, e.code());
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
