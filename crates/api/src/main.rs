use anyhow::Context;

use stockflow_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockflow_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let service = stockflow_api::app::build_service(&config).await?;
    let app = stockflow_api::app::build_app(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}
