use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    warden_observability::init();

    let config = warden_api::config::AppConfig::from_env()?;
    let services = Arc::new(warden_api::app::services::build_services(&config).await?);
    let app = warden_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
