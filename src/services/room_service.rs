use std::time::SystemTime;

use rand::{Rng, rng};
use tracing::{info, warn};

use crate::{
    dao::{
        models::{PlayerEntity, RoomEntity},
        room_store::RoomStore,
    },
    dto::room::{
        AckResponse, CreateRoomRequest, CreateRoomResponse, JoinRoomResponse, RoomSnapshot,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        room::{Departure, QUESTIONS_PER_GAME},
    },
};

const ROOM_ID_PREFIX: &str = "ROOM";
const ROOM_ID_SUFFIX_LEN: usize = 10;
const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_ID_ATTEMPTS: usize = 5;

/// Create a waiting room owned by the requester.
pub async fn create_room(
    state: &SharedState,
    requester: PlayerEntity,
    request: CreateRoomRequest,
) -> Result<CreateRoomResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let room_id = allocate_room_id(store.as_ref()).await?;
    let room = RoomEntity::open(
        room_id.clone(),
        requester,
        request.max_players,
        SystemTime::now(),
    )?;
    let admin_id = room.admin_id.clone();

    store.put_room(room).await?;
    info!(
        room_id = %room_id,
        admin_id = %admin_id,
        max_players = request.max_players,
        "room created"
    );

    Ok(CreateRoomResponse {
        success: true,
        room_id,
        admin_id,
    })
}

/// Add the requester to a waiting room.
pub async fn join_room(
    state: &SharedState,
    requester: PlayerEntity,
    room_id: String,
) -> Result<JoinRoomResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let _gate = state.lock_room(&room_id).await;

    let mut room = load_room(store.as_ref(), &room_id).await?;
    let player_id = requester.id.clone();
    let updates = room.admit(requester)?;

    if !store.update_room(room_id.clone(), updates).await? {
        return Err(room_not_found(&room_id));
    }
    info!(
        room_id = %room_id,
        player_id = %player_id,
        players = room.players.len(),
        "player joined room"
    );
    sse_events::broadcast_room(state, &room);

    Ok(JoinRoomResponse {
        success: true,
        room: room.into(),
    })
}

/// Remove the requester from a room, deleting it when it empties or loses its admin.
pub async fn leave_room(
    state: &SharedState,
    requester: &PlayerEntity,
    room_id: String,
) -> Result<AckResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let _gate = state.lock_room(&room_id).await;

    let mut room = load_room(store.as_ref(), &room_id).await?;
    if !room.has_player(&requester.id) {
        return Ok(AckResponse::ok());
    }

    match room.depart(&requester.id) {
        Departure::Closed => {
            store.delete_room(room_id.clone()).await?;
            state.forget_room(&room_id);
            info!(room_id = %room_id, player_id = %requester.id, "room closed");
            sse_events::broadcast_room_closed(state, &room_id);
        }
        Departure::Remaining => {
            store.put_room(room.clone()).await?;
            info!(room_id = %room_id, player_id = %requester.id, "player left room");
            sse_events::broadcast_room(state, &room);
        }
    }

    Ok(AckResponse::ok())
}

/// Draw the questions and move the room to `playing`. Admin only.
pub async fn start_game(
    state: &SharedState,
    requester: &PlayerEntity,
    room_id: String,
) -> Result<AckResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let _gate = state.lock_room(&room_id).await;

    let mut room = load_room(store.as_ref(), &room_id).await?;
    let bank = state.question_bank();
    let updates = room.begin(&requester.id, || bank.sample(QUESTIONS_PER_GAME))?;

    if !store.update_room(room_id.clone(), updates).await? {
        return Err(room_not_found(&room_id));
    }
    info!(
        room_id = %room_id,
        players = room.players.len(),
        questions = room.questions.len(),
        "game started"
    );
    sse_events::broadcast_room(state, &room);

    Ok(AckResponse::ok())
}

/// Read-only view of a room.
pub async fn get_room(state: &SharedState, room_id: &str) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(store.as_ref(), room_id).await?;
    Ok(room.into())
}

async fn load_room(store: &dyn RoomStore, room_id: &str) -> Result<RoomEntity, ServiceError> {
    store
        .find_room(room_id.to_string())
        .await?
        .ok_or_else(|| room_not_found(room_id))
}

fn room_not_found(room_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("room `{room_id}` not found"))
}

/// Draw room ids until one is free; `put_room` upserts, so a taken id must not be reused.
async fn allocate_room_id(store: &dyn RoomStore) -> Result<String, ServiceError> {
    let mut candidate = generate_room_id();
    for _ in 1..ROOM_ID_ATTEMPTS {
        if store.find_room(candidate.clone()).await?.is_none() {
            return Ok(candidate);
        }
        warn!(room_id = %candidate, "room id collision; drawing another");
        candidate = generate_room_id();
    }
    Ok(candidate)
}

/// `ROOM` followed by 10 uppercase alphanumerics.
pub fn generate_room_id() -> String {
    let mut rng = rng();
    let suffix: String = (0..ROOM_ID_SUFFIX_LEN)
        .map(|_| ROOM_ID_ALPHABET[rng.random_range(0..ROOM_ID_ALPHABET.len())] as char)
        .collect();
    format!("{ROOM_ID_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_ids_have_prefix_and_uppercase_suffix() {
        for _ in 0..50 {
            let id = generate_room_id();
            assert_eq!(id.len(), ROOM_ID_PREFIX.len() + ROOM_ID_SUFFIX_LEN);
            let suffix = id.strip_prefix(ROOM_ID_PREFIX).unwrap();
            assert!(
                suffix
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }
}
