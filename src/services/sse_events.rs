use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::RoomEntity,
    dto::{
        room::RoomSnapshot,
        sse::{RoomClosedEvent, ServerEvent},
    },
    state::SharedState,
};

const EVENT_ROOM: &str = "room";
const EVENT_ROOM_CLOSED: &str = "room.closed";

/// Push the current room snapshot to the room's listeners.
pub fn broadcast_room(state: &SharedState, room: &RoomEntity) {
    if !state.room_events().has_listeners(&room.room_id) {
        return;
    }

    let snapshot = RoomSnapshot::from(room.clone());
    if let Some(event) = room_event(&snapshot) {
        state.room_events().publish(&room.room_id, event);
    }
}

/// Encode a snapshot as a `room` event.
pub fn room_event(snapshot: &RoomSnapshot) -> Option<ServerEvent> {
    encode(EVENT_ROOM, snapshot)
}

/// Tell listeners the room is gone and end their streams.
pub fn broadcast_room_closed(state: &SharedState, room_id: &str) {
    let payload = RoomClosedEvent {
        room_id: room_id.to_string(),
    };
    if let Some(event) = encode(EVENT_ROOM_CLOSED, &payload) {
        state.room_events().close(room_id, event);
    }
}

fn encode(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize room SSE payload");
            None
        }
    }
}
