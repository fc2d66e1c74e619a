/// OpenAPI documentation generation.
pub mod documentation;
/// Answer submission and end-of-game handling.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Finished game records.
pub mod history_service;
/// Room creation, membership and start.
pub mod room_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Storage connection supervisor with in-memory fallback.
pub mod storage_supervisor;
