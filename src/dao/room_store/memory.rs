//! Process-local store used for tests, local development and as the explicit
//! fallback when the database cannot be reached.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use super::{RoomStore, RoomUpdate};
use crate::dao::{
    models::{GameHistoryEntity, RoomEntity},
    storage::StorageResult,
};

/// In-memory [`RoomStore`] implementation. Data does not survive a restart.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    rooms: DashMap<String, RoomEntity>,
    history: RwLock<Vec<GameHistoryEntity>>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomStore for MemoryRoomStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn put_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.rooms.insert(room.room_id.clone(), room);
            Ok(())
        })
    }

    fn find_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.rooms.get(&room_id).map(|entry| entry.clone())) })
    }

    fn update_room(
        &self,
        room_id: String,
        updates: Vec<RoomUpdate>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let Some(mut room) = inner.rooms.get_mut(&room_id) else {
                return Ok(false);
            };
            for update in updates {
                update.apply(&mut room);
            }
            Ok(true)
        })
    }

    fn delete_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.rooms.remove(&room_id).is_some()) })
    }

    fn insert_history(&self, record: GameHistoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut history = inner.history.write().await;
            if history.iter().all(|stored| stored.id != record.id) {
                history.push(record);
            }
            Ok(())
        })
    }

    fn list_history(
        &self,
        player_id: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<GameHistoryEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.history.read().await;
            let mut records: Vec<GameHistoryEntity> = guard
                .iter()
                .filter(|record| record.player_id == player_id)
                .cloned()
                .collect();
            drop(guard);

            records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
            records.truncate(limit);
            Ok(records)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
