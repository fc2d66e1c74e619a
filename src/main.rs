//! quiz-rooms-back binary entrypoint wiring REST, SSE and the room store.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiz_rooms_back::{
    config::{AppConfig, StorageBackend},
    dao::room_store::MemoryRoomStore,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = init_storage(&config);

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the configured room store, or start its supervisor when it needs a connection.
fn init_storage(config: &AppConfig) -> SharedState {
    match config.storage {
        StorageBackend::Memory => {
            info!("using in-memory room store");
            AppState::with_store(config, Arc::new(MemoryRoomStore::new()))
        }
        StorageBackend::Mongo => init_mongo(config),
    }
}

#[cfg(feature = "mongo-store")]
fn init_mongo(config: &AppConfig) -> SharedState {
    use quiz_rooms_back::{
        dao::{
            room_store::{
                RoomStore,
                mongodb::{MongoConfig, MongoRoomStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor::{self, FallbackPolicy},
    };

    let state = AppState::new(config);
    let uri = config.mongo_uri.clone();
    let database = config.mongo_db.clone();
    let policy = FallbackPolicy::from_flag(config.fallback_to_memory);

    tokio::spawn(storage_supervisor::run(state.clone(), policy, move || {
        let uri = uri.clone();
        let database = database.clone();
        async move {
            let mongo_config = MongoConfig::from_uri(&uri, &database).await?;
            let store = MongoRoomStore::connect(mongo_config).await?;
            Ok::<Arc<dyn RoomStore>, StorageError>(Arc::new(store))
        }
    }));

    state
}

#[cfg(not(feature = "mongo-store"))]
fn init_mongo(config: &AppConfig) -> SharedState {
    warn!("built without the `mongo-store` feature; falling back to in-memory room store");
    AppState::with_store(config, Arc::new(MemoryRoomStore::new()))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
