use anyhow::Context;

use storefront_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    storefront_observability::init(&config.log);

    if config.insecure_jwt_secret {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = storefront_api::app::build_app(&config)
        .await
        .context("failed to initialize stores")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
