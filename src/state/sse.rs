use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Capacity of each per-room broadcast channel.
const ROOM_CHANNEL_CAPACITY: usize = 16;

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Live receivers on this hub.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Lazily created hubs, one per room that has at least one listener.
#[derive(Default)]
pub struct RoomEventHubs {
    hubs: DashMap<String, SseHub>,
}

impl RoomEventHubs {
    /// No hubs until someone subscribes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the events of `room_id`, creating its hub on first use.
    pub fn subscribe(&self, room_id: &str) -> broadcast::Receiver<ServerEvent> {
        self.hubs
            .entry(room_id.to_owned())
            .or_insert_with(|| SseHub::new(ROOM_CHANNEL_CAPACITY))
            .subscribe()
    }

    /// Publish to the room's listeners. Rooms nobody listens to are skipped.
    pub fn publish(&self, room_id: &str, event: ServerEvent) {
        if let Some(hub) = self.hubs.get(room_id) {
            hub.broadcast(event);
        }
    }

    /// Send a final event and drop the hub, which ends every open stream.
    pub fn close(&self, room_id: &str, event: ServerEvent) {
        if let Some((_, hub)) = self.hubs.remove(room_id) {
            hub.broadcast(event);
        }
    }

    /// Drop the hub of `room_id` once its last listener is gone.
    pub fn prune(&self, room_id: &str) {
        self.hubs
            .remove_if(room_id, |_, hub| hub.subscriber_count() == 0);
    }

    /// Whether anyone streams `room_id`.
    pub fn has_listeners(&self, room_id: &str) -> bool {
        self.hubs
            .get(room_id)
            .is_some_and(|hub| hub.subscriber_count() > 0)
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::RecvError;

    use super::*;

    #[tokio::test]
    async fn publish_reaches_room_subscribers_only() {
        let hubs = RoomEventHubs::new();
        let mut a = hubs.subscribe("ROOMA");
        let mut b = hubs.subscribe("ROOMB");

        hubs.publish("ROOMA", ServerEvent::new(Some("room".into()), "a".into()));
        hubs.publish("ROOMC", ServerEvent::new(Some("room".into()), "c".into()));

        assert_eq!(a.recv().await.unwrap().data, "a");
        assert!(b.try_recv().is_err());
    }

    #[tokio::test]
    async fn close_delivers_final_event_then_ends_stream() {
        let hubs = RoomEventHubs::new();
        let mut rx = hubs.subscribe("ROOMA");
        assert!(hubs.has_listeners("ROOMA"));

        hubs.close("ROOMA", ServerEvent::new(Some("closed".into()), "{}".into()));

        let last = rx.recv().await.unwrap();
        assert_eq!(last.event.as_deref(), Some("closed"));
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
        assert!(!hubs.has_listeners("ROOMA"));
    }

    #[test]
    fn prune_keeps_hubs_with_listeners() {
        let hubs = RoomEventHubs::new();
        let rx = hubs.subscribe("ROOMA");
        hubs.prune("ROOMA");
        assert!(hubs.has_listeners("ROOMA"));

        drop(rx);
        hubs.prune("ROOMA");
        assert!(hubs.hubs.is_empty());
    }
}
