use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::history::GameHistorySummary, error::AppError, routes::identity::Requester,
    services::history_service, state::SharedState,
};

/// History endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/history", get(list_history))
}

/// The caller's 20 most recent finished games, newest first.
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    responses(
        (status = 200, description = "Finished games", body = [GameHistorySummary]),
        (status = 401, description = "Missing identity headers")
    )
)]
pub async fn list_history(
    State(state): State<SharedState>,
    Requester(player): Requester,
) -> Result<Json<Vec<GameHistorySummary>>, AppError> {
    let records = history_service::list_history(&state, &player.id).await?;
    Ok(Json(records))
}
