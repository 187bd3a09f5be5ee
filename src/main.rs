use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flixreview_recs::{
    create_router,
    db::{create_redis_client, Cache, CacheWriterHandle},
    services::{CachedBackend, CatalogBackend, HttpBackend},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flixreview_recs=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let http_backend: Arc<dyn CatalogBackend> =
        Arc::new(HttpBackend::new(config.backend_api_url.clone()));

    let (backend, cache_handle): (Arc<dyn CatalogBackend>, Option<CacheWriterHandle>) =
        match &config.redis_url {
            Some(redis_url) => {
                let client = create_redis_client(redis_url)?;
                let (cache, handle) = Cache::new(client).await;
                tracing::info!("Redis cache enabled for feeds and similar movies");
                (Arc::new(CachedBackend::new(http_backend, cache)), Some(handle))
            }
            None => {
                tracing::info!("REDIS_URL not set, caching disabled");
                (http_backend, None)
            }
        };

    tracing::info!(
        backend = backend.name(),
        api_url = %config.backend_api_url,
        algorithm = config.recommendation_algorithm.as_str(),
        "Backend configured"
    );

    let state = Arc::new(AppState::new(backend, &config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
