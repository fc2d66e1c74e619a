use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::room::{
        AckResponse, CreateRoomRequest, CreateRoomResponse, JoinRoomResponse, RoomIdRequest,
        RoomSnapshot,
    },
    error::AppError,
    routes::{extract::JsonBody, identity::Requester},
    services::room_service,
    state::SharedState,
};

/// Room lifecycle endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/join", post(join_room))
        .route("/rooms/leave", post(leave_room))
        .route("/rooms/start", post(start_game))
        .route("/rooms/{room_id}", get(get_room))
}

/// Create a room with the caller as admin and first player.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = CreateRoomResponse),
        (status = 400, description = "Capacity outside 2..=10"),
        (status = 401, description = "Missing identity headers")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Requester(player): Requester,
    JsonBody(payload): JsonBody<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    payload.validate()?;
    let response = room_service::create_room(&state, player, payload).await?;
    Ok(Json(response))
}

/// Join a waiting room.
#[utoipa::path(
    post,
    path = "/rooms/join",
    tag = "rooms",
    request_body = RoomIdRequest,
    responses(
        (status = 200, description = "Joined; returns the updated room", body = JoinRoomResponse),
        (status = 404, description = "Unknown room"),
        (status = 409, description = "Room not waiting, full, or already joined")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Requester(player): Requester,
    JsonBody(payload): JsonBody<RoomIdRequest>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    payload.validate()?;
    let response = room_service::join_room(&state, player, payload.room_id).await?;
    Ok(Json(response))
}

/// Leave a room. An admin leaving closes the room for everyone.
#[utoipa::path(
    post,
    path = "/rooms/leave",
    tag = "rooms",
    request_body = RoomIdRequest,
    responses(
        (status = 200, description = "Left the room", body = AckResponse),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    Requester(player): Requester,
    JsonBody(payload): JsonBody<RoomIdRequest>,
) -> Result<Json<AckResponse>, AppError> {
    payload.validate()?;
    Ok(Json(room_service::leave_room(&state, &player, payload.room_id).await?))
}

/// Start the game. Admin only.
#[utoipa::path(
    post,
    path = "/rooms/start",
    tag = "rooms",
    request_body = RoomIdRequest,
    responses(
        (status = 200, description = "Game started", body = AckResponse),
        (status = 403, description = "Caller is not the admin"),
        (status = 404, description = "Unknown room"),
        (status = 409, description = "Room not waiting or not enough players")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Requester(player): Requester,
    JsonBody(payload): JsonBody<RoomIdRequest>,
) -> Result<Json<AckResponse>, AppError> {
    payload.validate()?;
    Ok(Json(room_service::start_game(&state, &player, payload.room_id).await?))
}

/// Current room state, polled by clients every few seconds.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Identifier of the room")),
    responses(
        (status = 200, description = "Room snapshot", body = RoomSnapshot),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    Ok(Json(room_service::get_room(&state, &room_id).await?))
}
