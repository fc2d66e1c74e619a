use axum::{Json, Router, extract::State, routing::post};
use validator::Validate;

use crate::{
    dto::game::{SubmitAnswerRequest, SubmitAnswerResponse},
    error::AppError,
    routes::{extract::JsonBody, identity::Requester},
    services::game_service,
    state::SharedState,
};

/// Gameplay endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/game/answer", post(submit_answer))
}

/// Submit the caller's answer to one question of a running game.
#[utoipa::path(
    post,
    path = "/game/answer",
    tag = "game",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 400, description = "Question index out of bounds"),
        (status = 403, description = "Caller is not in the room"),
        (status = 409, description = "Game not active or question already answered")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Requester(player): Requester,
    JsonBody(payload): JsonBody<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    payload.validate()?;
    let response = game_service::submit_answer(&state, &player, payload).await?;
    Ok(Json(response))
}
