use anyhow::Context;
use server::{Deployment, config::ServerConfig, routes};
use services::services::config::ResolverConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init();

    let config = ServerConfig::from_env();
    let resolver_config = ResolverConfig::from_env();

    let deployment = Deployment::new(&config.database_url, &resolver_config)
        .await
        .context("failed to initialise deployment")?;
    let app = routes::router(deployment);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
