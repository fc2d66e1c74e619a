/// Per-room write serialization.
pub mod gate;
/// Question pool and sampling.
pub mod questions;
/// Room rules applied before anything is persisted.
pub mod room;
mod sse;
/// Room lifecycle transitions.
pub mod status;

use std::sync::Arc;

use tokio::sync::{OwnedMutexGuard, RwLock, watch};

use crate::{config::AppConfig, dao::room_store::RoomStore, error::ServiceError};

pub use self::sse::{RoomEventHubs, SseHub};
use self::{gate::RoomGates, questions::QuestionBank};

/// Handle cloned into every handler and task.
pub type SharedState = Arc<AppState>;

/// Central application state: the installed store, the question pool and the
/// per-room coordination primitives.
pub struct AppState {
    room_store: RwLock<Option<Arc<dyn RoomStore>>>,
    degraded: watch::Sender<bool>,
    questions: QuestionBank,
    gates: RoomGates,
    room_events: RoomEventHubs,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: &AppConfig) -> SharedState {
        Self::build(config, None)
    }

    /// Construct the state with `store` already installed.
    pub fn with_store(config: &AppConfig, store: Arc<dyn RoomStore>) -> SharedState {
        Self::build(config, Some(store))
    }

    fn build(config: &AppConfig, store: Option<Arc<dyn RoomStore>>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(store.is_none());
        Arc::new(Self {
            room_store: RwLock::new(store),
            degraded: degraded_tx,
            questions: QuestionBank::new(config.questions.clone()),
            gates: RoomGates::new(config.serialize_room_writes),
            room_events: RoomEventHubs::new(),
        })
    }

    /// Obtain a handle to the current room store, if one is installed.
    pub async fn room_store(&self) -> Option<Arc<dyn RoomStore>> {
        let guard = self.room_store.read().await;
        guard.as_ref().cloned()
    }

    /// Same as [`AppState::room_store`] but fails with [`ServiceError::Degraded`].
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomStore>, ServiceError> {
        self.room_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new room store implementation and leave degraded mode.
    pub async fn install_room_store(&self, store: Arc<dyn RoomStore>) {
        {
            let mut guard = self.room_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current room store and enter degraded mode.
    pub async fn clear_room_store(&self) {
        {
            let mut guard = self.room_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        if self.is_degraded() == value {
            return;
        }

        self.degraded.send_replace(value);
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Pool games draw questions from.
    pub fn question_bank(&self) -> &QuestionBank {
        &self.questions
    }

    /// Serialize mutations of one room; `None` when the gate is disabled.
    pub async fn lock_room(&self, room_id: &str) -> Option<OwnedMutexGuard<()>> {
        self.gates.lock(room_id).await
    }

    pub(crate) fn forget_room(&self, room_id: &str) {
        self.gates.forget(room_id);
    }

    /// Per-room hubs backing the `/rooms/{roomId}/events` streams.
    pub fn room_events(&self) -> &RoomEventHubs {
        &self.room_events
    }
}
