/// Process-local store.
pub mod memory;
/// MongoDB-backed store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::{
    models::{GameHistoryEntity, PlayerEntity, QuestionEntity, RoomEntity, RoomStatus},
    storage::StorageResult,
};

pub use self::memory::MemoryRoomStore;

/// Targeted change merged into a stored room without rewriting the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomUpdate {
    /// Append a player at the end of the join order.
    PushPlayer(PlayerEntity),
    /// Set one player's score.
    SetScore {
        /// Player whose score changes.
        player_id: String,
        /// New score value.
        score: u32,
    },
    /// Replace the lifecycle status.
    SetStatus(RoomStatus),
    /// Replace the drawn questions.
    SetQuestions(Vec<QuestionEntity>),
    /// Move the shared cursor.
    SetCurrentQuestionIndex(usize),
}

impl RoomUpdate {
    /// Apply the change to an in-memory copy of the room.
    pub fn apply(self, room: &mut RoomEntity) {
        match self {
            RoomUpdate::PushPlayer(player) => room.players.push(player),
            RoomUpdate::SetScore { player_id, score } => {
                room.scores.insert(player_id, score);
            }
            RoomUpdate::SetStatus(status) => room.status = status,
            RoomUpdate::SetQuestions(questions) => room.questions = questions,
            RoomUpdate::SetCurrentQuestionIndex(index) => room.current_question_index = index,
        }
    }
}

/// Abstraction over the persistence layer for rooms and finished-game history.
pub trait RoomStore: Send + Sync {
    /// Short backend label used in logs and health output.
    fn kind(&self) -> &'static str;
    /// Upsert the full room record.
    fn put_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a room by id.
    fn find_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Merge targeted updates into a stored room. Returns `false` when no room matched.
    fn update_room(
        &self,
        room_id: String,
        updates: Vec<RoomUpdate>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove a room. Returns `false` when it did not exist.
    fn delete_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<bool>>;
    /// Store one history record. A record whose id is already stored is left as is.
    fn insert_history(&self, record: GameHistoryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Most recent history records of a player, newest first, at most `limit`.
    fn list_history(
        &self,
        player_id: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<GameHistoryEntity>>>;
    /// Cheap liveness probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
