//! Offer Express — in-memory multi-armed-bandit offer ranking service.
//!
//! Main entry point that loads configuration, builds the engine, and starts
//! the HTTP server.

use clap::Parser;
use offer_api::ApiServer;
use offer_bandit::BanditEngine;
use offer_core::config::AppConfig;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "offer-express")]
#[command(about = "Multi-armed-bandit offer ranking service")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "OFFER_EXPRESS__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "OFFER_EXPRESS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Metrics port (overrides config)
    #[arg(long, env = "OFFER_EXPRESS__METRICS__PORT")]
    metrics_port: Option<u16>,

    /// Fixed RNG seed for Thompson sampling (overrides config)
    #[arg(long, env = "OFFER_EXPRESS__BANDIT__SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offer_express=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Offer Express starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }
    if let Some(seed) = cli.seed {
        config.bandit.seed = Some(seed);
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        "Configuration loaded"
    );

    // Build the bandit engine; a configured seed makes Thompson draws
    // reproducible across restarts.
    let engine = Arc::new(match config.bandit.seed {
        Some(seed) => BanditEngine::with_seed(seed),
        None => BanditEngine::new(),
    });

    let api_server = ApiServer::new(config.clone(), engine);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Offer Express is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
