use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Installed storage backend ("memory" or "mongo"), absent while degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(storage: &str) -> Self {
        Self {
            status: "ok".to_string(),
            storage: Some(storage.to_string()),
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(storage: Option<&str>) -> Self {
        Self {
            status: "degraded".to_string(),
            storage: storage.map(str::to_string),
        }
    }
}
