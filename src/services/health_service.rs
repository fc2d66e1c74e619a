use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the installed store and report whether the service is degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.room_store().await else {
        warn!("storage unavailable (degraded mode)");
        return HealthResponse::degraded(None);
    };

    if let Err(err) = store.health_check().await {
        warn!(storage = store.kind(), error = %err, "storage health check failed");
        return HealthResponse::degraded(Some(store.kind()));
    }

    if state.is_degraded() {
        HealthResponse::degraded(Some(store.kind()))
    } else {
        HealthResponse::ok(store.kind())
    }
}
