//! Application-level configuration loading: storage selection, write gating and
//! the question pool.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{dao::models::QuestionEntity, state::room::QUESTIONS_PER_GAME};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_ROOMS_CONFIG_PATH";
/// Environment variable that overrides the configured storage backend.
const STORE_ENV: &str = "ROOM_STORE";
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGO_DB: &str = "flashcard-frenzy";
const DEFAULT_PORT: u16 = 8080;

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongo,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Room store selected at startup.
    pub storage: StorageBackend,
    /// Install the in-memory store when the database cannot be reached.
    pub fallback_to_memory: bool,
    /// Serialize mutating operations per room inside this process.
    pub serialize_room_writes: bool,
    /// Question pool games draw from.
    pub questions: Vec<QuestionEntity>,
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// Database holding rooms and history.
    pub mongo_db: String,
    /// HTTP listen port.
    pub port: u16,
}

impl AppConfig {
    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        config.apply_env();
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        storage = ?app_config.storage,
                        questions = app_config.questions.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn apply_env(&mut self) {
        if let Some(value) = non_empty_env(STORE_ENV) {
            match value.parse() {
                Ok(storage) => self.storage = storage,
                Err(err) => warn!(error = %err, "ignoring {STORE_ENV}"),
            }
        }
        if let Some(uri) = non_empty_env("MONGO_URI") {
            self.mongo_uri = uri;
        }
        if let Some(db) = non_empty_env("MONGO_DB") {
            self.mongo_db = db;
        }
        if let Some(port) = non_empty_env("PORT")
            .or_else(|| non_empty_env("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Mongo,
            fallback_to_memory: true,
            serialize_room_writes: true,
            questions: default_questions(),
            mongo_uri: DEFAULT_MONGO_URI.into(),
            mongo_db: DEFAULT_MONGO_DB.into(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    storage: Option<StorageBackend>,
    fallback_to_memory: Option<bool>,
    serialize_room_writes: Option<bool>,
    questions: Option<Vec<RawQuestion>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        let questions = match value.questions {
            Some(raw) if raw.len() >= QUESTIONS_PER_GAME => {
                raw.into_iter().map(Into::into).collect()
            }
            Some(raw) => {
                warn!(
                    count = raw.len(),
                    required = QUESTIONS_PER_GAME,
                    "configured question pool too small; using built-in questions"
                );
                defaults.questions
            }
            None => defaults.questions,
        };

        Self {
            storage: value.storage.unwrap_or(defaults.storage),
            fallback_to_memory: value
                .fallback_to_memory
                .unwrap_or(defaults.fallback_to_memory),
            serialize_room_writes: value
                .serialize_room_writes
                .unwrap_or(defaults.serialize_room_writes),
            questions,
            ..defaults
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single question entry inside the configuration file.
struct RawQuestion {
    id: String,
    question: String,
    answer: String,
}

impl From<RawQuestion> for QuestionEntity {
    fn from(value: RawQuestion) -> Self {
        Self {
            id: value.id,
            question: value.question,
            answer: value.answer,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Built-in question pool shipped with the binary.
fn default_questions() -> Vec<QuestionEntity> {
    [
        ("What is the capital of India?", "New Delhi"),
        ("What is 5 + 7?", "12"),
        ("Which planet is known as the Red Planet?", "Mars"),
        ("Who wrote \"Romeo and Juliet\"?", "William Shakespeare"),
        ("What is the largest ocean on Earth?", "Pacific Ocean"),
        ("What is 8 × 6?", "48"),
        ("Which country is known as the Land of the Rising Sun?", "Japan"),
        ("What is the chemical symbol for gold?", "Au"),
        ("How many continents are there?", "7"),
        ("What is the capital of France?", "Paris"),
        ("Which animal is known as the King of the Jungle?", "Lion"),
        ("What is 15 - 8?", "7"),
        ("Which gas do plants absorb from the atmosphere?", "Carbon Dioxide"),
        ("What is the smallest prime number?", "2"),
        ("Which river is the longest in the world?", "Nile River"),
        ("What is 3 × 9?", "27"),
        ("Who painted the Mona Lisa?", "Leonardo da Vinci"),
        ("What is the hardest natural substance?", "Diamond"),
        ("How many sides does a triangle have?", "3"),
        ("What is the capital of United States?", "Washington D.C."),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (question, answer))| QuestionEntity {
        id: (index + 1).to_string(),
        question: question.into(),
        answer: answer.into(),
    })
    .collect()
}
