use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-room async mutexes serializing read-modify-write cycles on one room
/// inside this process. Disabled gates hand out no guard at all.
pub struct RoomGates {
    enabled: bool,
    gates: DashMap<String, Arc<Mutex<()>>>,
}

impl RoomGates {
    /// Gates that serialize writes when `enabled`, and hand out nothing otherwise.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            gates: DashMap::new(),
        }
    }

    /// Wait for exclusive access to `room_id`. The guard releases on drop.
    pub async fn lock(&self, room_id: &str) -> Option<OwnedMutexGuard<()>> {
        if !self.enabled {
            return None;
        }

        // Clone the Arc out so the shard lock is not held across the await.
        let gate = self
            .gates
            .entry(room_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Some(gate.lock_owned().await)
    }

    /// Drop the gate of a deleted room.
    pub fn forget(&self, room_id: &str) {
        self.gates.remove(room_id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn same_room_is_exclusive() {
        let gates = RoomGates::new(true);
        let held = gates.lock("ROOMA").await;
        assert!(held.is_some());

        let blocked = timeout(Duration::from_millis(50), gates.lock("ROOMA")).await;
        assert!(blocked.is_err());

        let other = timeout(Duration::from_millis(50), gates.lock("ROOMB")).await;
        assert!(other.is_ok());

        drop(held);
        let reacquired = timeout(Duration::from_millis(50), gates.lock("ROOMA")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn disabled_gates_never_block() {
        let gates = RoomGates::new(false);
        let first = gates.lock("ROOMA").await;
        assert!(first.is_none());
        assert!(gates.lock("ROOMA").await.is_none());
    }
}
