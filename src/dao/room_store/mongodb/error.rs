use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB store internals.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB room store, converted to `StorageError` at the trait boundary.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("`{0}` is not a usable MongoDB database name")]
    InvalidDatabaseName(String),
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed while connecting after {attempts} attempt(s)")]
    PingExhausted {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("connection schedule allows no ping attempts")]
    NoPingAttempts,
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save room `{room_id}`")]
    SaveRoom {
        room_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load room `{room_id}`")]
    LoadRoom {
        room_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to update room `{room_id}`")]
    UpdateRoom {
        room_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete room `{room_id}`")]
    DeleteRoom {
        room_id: String,
        #[source]
        source: MongoError,
    },
    #[error("room `{room_id}` holds an answer under non-numeric question index `{key}`")]
    CorruptAnswerKey { room_id: String, key: String },
    #[error("failed to insert history record for player `{player_id}`")]
    InsertHistory {
        player_id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list history for player `{player_id}`")]
    ListHistory {
        player_id: String,
        #[source]
        source: MongoError,
    },
}
