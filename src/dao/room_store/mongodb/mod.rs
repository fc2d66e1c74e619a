mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoRoomStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::CorruptAnswerKey { room_id, key } => StorageError::Corrupt {
                record: format!("room `{room_id}`"),
                detail: format!("answer keyed by non-numeric question index `{key}`"),
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
