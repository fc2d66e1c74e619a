use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

// Characters MongoDB refuses in database names.
const FORBIDDEN_DB_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$'];

/// Parsed client options plus the database holding rooms and history.
#[derive(Clone)]
pub struct MongoConfig {
    /// Client options parsed from the URI.
    pub options: ClientOptions,
    /// Validated database name.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse a connection URI. The database name comes from the application config
    /// and is checked before any connection is attempted.
    pub async fn from_uri(uri: &str, database_name: &str) -> MongoResult<Self> {
        let database_name = database_name.trim();
        if database_name.is_empty() || database_name.contains(FORBIDDEN_DB_CHARS) {
            return Err(MongoDaoError::InvalidDatabaseName(database_name.to_owned()));
        }

        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })?;
        options
            .app_name
            .get_or_insert_with(|| env!("CARGO_PKG_NAME").to_owned());

        Ok(Self {
            options,
            database_name: database_name.to_owned(),
        })
    }
}
