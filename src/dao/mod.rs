/// Database model definitions.
pub mod models;
/// Room and history storage backends.
pub mod room_store;
/// Storage abstraction layer for database operations.
pub mod storage;
