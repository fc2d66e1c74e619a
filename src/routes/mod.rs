use axum::Router;

use crate::state::SharedState;

/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Request extractors shared by the handlers.
pub mod extract;
/// Answer submission.
pub mod game;
/// Health probe.
pub mod health;
/// Finished-game history.
pub mod history;
/// Caller identity from trusted headers.
pub mod identity;
/// Room lifecycle.
pub mod rooms;
/// Room event streams.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(rooms::router())
        .merge(sse::router())
        .merge(game::router())
        .merge(history::router());

    api_router.merge(docs::router()).with_state(state)
}
