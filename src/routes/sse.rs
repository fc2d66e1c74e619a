use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError,
    services::{sse_events, sse_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/rooms/{room_id}/events",
    tag = "sse",
    params(("room_id" = String, Path, description = "Identifier of the room")),
    responses(
        (
            status = 200,
            description = "`room` snapshots after each change, then `room.closed`",
            content_type = "text/event-stream",
            body = String
        ),
        (status = 404, description = "Unknown room")
    )
)]
/// Push room snapshots as they change. Polling `GET /rooms/{room_id}` stays supported.
pub async fn room_stream(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let (snapshot, receiver) = sse_service::subscribe_room(&state, &room_id).await?;
    info!(room_id = %room_id, "new room SSE connection");

    let initial = sse_events::room_event(&snapshot);
    Ok(sse_service::to_sse_stream(state, room_id, initial, receiver))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/rooms/{room_id}/events", get(room_stream))
}
