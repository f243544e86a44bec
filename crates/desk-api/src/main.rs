//! Case assignment API server
//!
//! Configuration comes from `DESK__*` environment variables; the flags below
//! override individual settings.

use std::sync::Arc;

use anyhow::{Context, Result};
use assignment_core::logging::{log_welcome, setup_logging};
use assignment_core::AssignmentConfig;
use clap::Parser;
use desk_api::create_router;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "desk-api", version, about = "Contact-center case assignment API")]
struct Args {
    /// SQLite database URL, e.g. sqlite://desk.db?mode=rwc
    #[arg(long)]
    database_url: Option<String>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Log filter directive (RUST_LOG wins when set)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(self, config: &mut AssignmentConfig) {
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(bind) = self.bind {
            config.api.bind_address = bind;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AssignmentConfig::from_env().context("loading configuration")?;
    args.apply(&mut config);
    config.validate().context("validating configuration")?;

    setup_logging(&config.logging)?;
    log_welcome("desk-api", env!("CARGO_PKG_VERSION"));

    let assigner = Arc::new(
        assignment_core::init(&config)
            .await
            .context("opening case store")?,
    );
    let app = create_router(assigner);

    let listener = TcpListener::bind(&config.api.bind_address)
        .await
        .with_context(|| format!("binding {}", config.api.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
