use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    config::MongoConfig,
    connection::{PingSchedule, establish_connection},
    error::{MongoDaoError, MongoResult},
    models::{MongoHistoryDocument, MongoRoomDocument, room_filter, update_document},
};
use crate::dao::{
    models::{GameHistoryEntity, RoomEntity},
    room_store::{RoomStore, RoomUpdate},
    storage::StorageResult,
};

const ROOM_COLLECTION_NAME: &str = "game-rooms";
const HISTORY_COLLECTION_NAME: &str = "game-history";
const DUPLICATE_KEY_CODE: i32 = 11000;

// History ids are derived from room and player, so a second insert of the same
// record hits the `_id` index.
fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

/// MongoDB-backed [`RoomStore`] implementation.
#[derive(Clone)]
pub struct MongoRoomStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(
            &self.config.options,
            &self.config.database_name,
            PingSchedule::RECONNECT,
        )
        .await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoRoomStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name, PingSchedule::STARTUP)
                .await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let rooms = self.room_collection().await;
        let room_index = mongodb::IndexModel::builder()
            .keys(doc! {"roomId": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("room_id_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        rooms
            .create_index(room_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ROOM_COLLECTION_NAME,
                index: "roomId",
                source,
            })?;

        // Serves the "recent games of a player" read path.
        let history = self.history_collection().await;
        let history_index = mongodb::IndexModel::builder()
            .keys(doc! {"playerId": 1, "completedAt": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("history_player_idx".to_owned()))
                    .build(),
            )
            .build();

        history
            .create_index(history_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: HISTORY_COLLECTION_NAME,
                index: "playerId,completedAt",
                source,
            })?;

        Ok(())
    }

    async fn room_collection(&self) -> Collection<MongoRoomDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoRoomDocument>(ROOM_COLLECTION_NAME)
    }

    async fn history_collection(&self) -> Collection<MongoHistoryDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoHistoryDocument>(HISTORY_COLLECTION_NAME)
    }

    async fn save_room(&self, room: RoomEntity) -> MongoResult<()> {
        let room_id = room.room_id.clone();
        let document: MongoRoomDocument = room.into();
        let collection = self.room_collection().await;
        collection
            .replace_one(room_filter(&room_id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveRoom { room_id, source })?;

        Ok(())
    }

    async fn find_room(&self, room_id: String) -> MongoResult<Option<RoomEntity>> {
        let collection = self.room_collection().await;
        let document = collection
            .find_one(room_filter(&room_id))
            .await
            .map_err(|source| MongoDaoError::LoadRoom {
                room_id: room_id.clone(),
                source,
            })?;

        document.map(RoomEntity::try_from).transpose()
    }

    async fn update_room(&self, room_id: String, updates: Vec<RoomUpdate>) -> MongoResult<bool> {
        let update = update_document(updates);
        if update.is_empty() {
            return Ok(self.find_room(room_id).await?.is_some());
        }

        let collection = self.room_collection().await;
        let result = collection
            .update_one(room_filter(&room_id), update)
            .await
            .map_err(|source| MongoDaoError::UpdateRoom { room_id, source })?;
        Ok(result.matched_count > 0)
    }

    async fn delete_room(&self, room_id: String) -> MongoResult<bool> {
        let collection = self.room_collection().await;
        let result = collection
            .delete_one(room_filter(&room_id))
            .await
            .map_err(|source| MongoDaoError::DeleteRoom { room_id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn insert_history(&self, record: GameHistoryEntity) -> MongoResult<()> {
        let player_id = record.player_id.clone();
        let document: MongoHistoryDocument = record.into();
        let collection = self.history_collection().await;
        match collection.insert_one(&document).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => {
                debug!(player_id = %player_id, "history record already stored");
                Ok(())
            }
            Err(source) => Err(MongoDaoError::InsertHistory { player_id, source }),
        }
    }

    async fn list_history(
        &self,
        player_id: String,
        limit: usize,
    ) -> MongoResult<Vec<GameHistoryEntity>> {
        let collection = self.history_collection().await;
        let documents: Vec<MongoHistoryDocument> = collection
            .find(doc! {"playerId": &player_id})
            .sort(doc! {"completedAt": -1})
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
            .map_err(|source| MongoDaoError::ListHistory {
                player_id: player_id.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListHistory {
                player_id: player_id.clone(),
                source,
            })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl RoomStore for MongoRoomStore {
    fn kind(&self) -> &'static str {
        "mongo"
    }

    fn put_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_room(room).await.map_err(Into::into) })
    }

    fn find_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_room(room_id).await.map_err(Into::into) })
    }

    fn update_room(
        &self,
        room_id: String,
        updates: Vec<RoomUpdate>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.update_room(room_id, updates).await.map_err(Into::into) })
    }

    fn delete_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_room(room_id).await.map_err(Into::into) })
    }

    fn insert_history(&self, record: GameHistoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_history(record).await.map_err(Into::into) })
    }

    fn list_history(
        &self,
        player_id: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<GameHistoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_history(player_id, limit)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
