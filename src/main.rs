//! PDF Compare Store - Entry point
//!
//! Serves the session document store over MCP on stdio.

use pdf_compare_store::{run_server_with_config, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries MCP traffic, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_compare_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        base_dir = %config.base_dir.display(),
        keep_latest = config.keep_latest,
        "Starting PDF compare server"
    );

    run_server_with_config(config).await
}
