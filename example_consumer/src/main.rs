//! Example server: loads a resource model and serves it over HTTP.
//!
//! Run from repo root: `cargo run -p resource-server`
//! Set `DATABASE_URL` to use PostgreSQL; otherwise data lives in memory.

use resource_sdk::{
    common_routes, ensure_database_exists, ensure_resource_tables, load_from_file,
    mounted_resource_routes, resolve, AppState, BroadcastEventSink, EventSink, FanoutEventSink,
    MemoryRepository, PersistenceRepository, PgRepository, Settings, TracingEventSink,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resource_sdk=info")),
        )
        .init();

    let config = load_from_file(&settings.resource_config).await?;
    let model = Arc::new(resolve(&config)?);
    tracing::info!(entities = model.registry.len(), prefix = %model.route.mount_path(), "resource model loaded");

    let repository: Arc<dyn PersistenceRepository> = match &settings.database_url {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let repository = PgRepository::new(pool, settings.default_page_size);
            ensure_resource_tables(repository.pool(), &resource_sdk::store::resource_schema()).await?;
            Arc::new(repository)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryRepository::new(settings.default_page_size))
        }
    };

    let bus = BroadcastEventSink::new(256);
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::debug!(kind = event.kind.as_str(), entity_type = %event.entity_type, "event received");
        }
    });
    let sinks: Arc<dyn EventSink> = Arc::new(
        FanoutEventSink::new()
            .with(Arc::new(TracingEventSink))
            .with(Arc::new(bus)),
    );

    let state = AppState::new(model, repository, sinks);
    let app = common_routes().merge(mounted_resource_routes(state, settings.body_limit_bytes));
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("resource server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
