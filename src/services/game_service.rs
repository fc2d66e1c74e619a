use std::time::SystemTime;

use tracing::{debug, info};

use crate::{
    dao::models::PlayerEntity,
    dto::game::{SubmitAnswerRequest, SubmitAnswerResponse},
    error::ServiceError,
    services::{history_service, sse_events},
    state::SharedState,
};

/// Record one answer, advance the shared cursor and close the game when it is over.
///
/// When the game ends every player's history record is written before the room
/// itself is persisted, so a successful response implies the history exists.
pub async fn submit_answer(
    state: &SharedState,
    requester: &PlayerEntity,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let SubmitAnswerRequest {
        room_id,
        answer,
        question_index,
    } = request;

    let store = state.require_room_store().await?;
    let _gate = state.lock_room(&room_id).await;

    let Some(mut room) = store.find_room(room_id.clone()).await? else {
        return Err(ServiceError::InvalidState(format!(
            "room `{room_id}` does not exist or its game is not active"
        )));
    };

    let now = SystemTime::now();
    let outcome = room.record_answer(&requester.id, question_index, answer, now)?;
    debug!(
        room_id = %room_id,
        player_id = %requester.id,
        question_index,
        correct = outcome.correct,
        "answer recorded"
    );

    if outcome.game_ended {
        history_service::record_game(store.as_ref(), &room, now).await?;
        info!(room_id = %room_id, "game finished");
    }

    store.put_room(room.clone()).await?;
    sse_events::broadcast_room(state, &room);

    Ok(outcome.into())
}
