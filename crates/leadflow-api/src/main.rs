//! Leadflow API server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use leadflow_api::{build_router, seed, ApiState, ServerConfig};
use leadflow_core::infrastructure::{InMemoryStore, TracingEventPublisher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "leadflow-api")]
#[command(author, version, about = "Lead assignment API server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "LEADFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and environment)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?.with_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = ApiState::in_memory(Arc::new(InMemoryStore::new()), Arc::new(TracingEventPublisher));
    seed(&state, &config).await.context("failed to load seed data")?;

    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Leadflow API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
