//! Sturdy API server binary

use miette::IntoDiagnostic;
use sturdy_server::{start_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("sturdy_server=info,sturdy_suggest=info,sturdy_core=info,tower_http=info")
        }))
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = ServerConfig::load();

    start_server(config).await.into_diagnostic()?;

    Ok(())
}
