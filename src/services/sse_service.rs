use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::{
    dto::{room::RoomSnapshot, sse::ServerEvent},
    error::ServiceError,
    services::room_service,
    state::SharedState,
};

/// Subscribe to a room's events, returning the current snapshot to send first.
pub async fn subscribe_room(
    state: &SharedState,
    room_id: &str,
) -> Result<(RoomSnapshot, broadcast::Receiver<ServerEvent>), ServiceError> {
    // Subscribe before reading so no mutation between the two is lost.
    let receiver = state.room_events().subscribe(room_id);
    match room_service::get_room(state, room_id).await {
        Ok(snapshot) => Ok((snapshot, receiver)),
        Err(err) => {
            drop(receiver);
            state.room_events().prune(room_id);
            Err(err)
        }
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    state: SharedState,
    room_id: String,
    initial: Option<ServerEvent>,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        forward(initial, &mut receiver, &tx).await;

        // Own the state inside the task so the hub is released even after the
        // request context is gone.
        drop(receiver);
        state.room_events().prune(&room_id);
        info!(room_id = %room_id, "room SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Pump events into `tx` until the client or the hub goes away.
async fn forward(
    initial: Option<ServerEvent>,
    receiver: &mut broadcast::Receiver<ServerEvent>,
    tx: &mpsc::Sender<Result<Event, Infallible>>,
) {
    if let Some(payload) = initial {
        if tx.send(Ok(to_event(payload))).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            _ = tx.closed() => break,
            recv_result = receiver.recv() => {
                match recv_result {
                    Ok(payload) => {
                        if tx.send(Ok(to_event(payload))).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(_)) => {
                        // Snapshots supersede each other; the next one catches up.
                        continue;
                    }
                }
            }
        }
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
