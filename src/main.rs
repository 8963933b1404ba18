use notes_api::{
    build_router, config,
    repository::{MemoryStore, NoteStore, PostgresStore},
    service::NoteService,
};

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    tracing::info!("Successfully loaded notes API config");

    // Store creation and migration
    let store: Arc<dyn NoteStore> = if let Some(dsn) = &cfg.database_dsn {
        let mut repo = PostgresStore::connect(dsn).await.unwrap_or_else(|e| {
            tracing::error!("Failed to establish database connection: {e}");
            panic!("failed to establish database connection: {e}");
        });

        repo.migrate().await.unwrap_or_else(|e| {
            tracing::error!("Failed to migrate database: {e}");
            panic!("failed to migrate database: {e}");
        });

        Arc::new(repo)
    } else {
        tracing::warn!("No database DSN configured, notes are kept in memory only");
        Arc::new(MemoryStore::new())
    };

    // Service creation
    let service = Arc::new(NoteService::new(store));

    if cfg.seed {
        service.seed_samples().await.unwrap_or_else(|e| {
            tracing::error!("Failed to seed sample notes: {e}");
            panic!("failed to seed sample notes: {e}");
        });
    }

    if cfg.debug {
        tracing::warn!("Debug mode enabled, server errors include diagnostic details");
    }
    let router = build_router(service, cfg.debug);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to port {}: {e}", cfg.port);
            panic!("failed to bind to port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Notes API starting, listening on {}", addr),
        Err(e) => tracing::warn!("Notes API starting, local address unknown: {e}"),
    }

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}
