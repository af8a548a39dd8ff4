use keygate_core::KeygateConfig;
use keygate_issuer::TokenIssuer;
use keygate_server::{AppState, create_router};
use keygate_store::RestStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = Arc::new(KeygateConfig::load()?);
    let store = Arc::new(RestStore::new(&config.endpoint, &config.master_key)?);
    let issuer = Arc::new(TokenIssuer::new(config.clone(), store));

    let app = create_router(AppState::new(issuer)).layer(TraceLayer::new_for_http());

    tracing::info!(
        database = %config.database,
        containers = config.containers.len(),
        "keygate-server listening on {}",
        config.bind
    );

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
