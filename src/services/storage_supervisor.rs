use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{
        room_store::{MemoryRoomStore, RoomStore},
        storage::StorageError,
    },
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// What to do when the configured backend cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Install the in-memory store and stop supervising.
    Memory,
    /// Stay degraded and keep retrying the backend.
    Retry,
}

impl FallbackPolicy {
    /// Map the `fallback_to_memory` config flag.
    pub fn from_flag(fallback_to_memory: bool) -> Self {
        if fallback_to_memory {
            FallbackPolicy::Memory
        } else {
            FallbackPolicy::Retry
        }
    }
}

/// Connect to the storage backend, watch its health and reconnect when it fails.
///
/// With [`FallbackPolicy::Memory`] a failed initial connection or exhausted
/// reconnects switch the service to [`MemoryRoomStore`] for the rest of the
/// process lifetime. Rooms held by the unreachable backend are not migrated.
pub async fn run<F, Fut>(state: SharedState, policy: FallbackPolicy, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RoomStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_room_store(store.clone()).await;
                info!(
                    storage = store.kind(),
                    "storage connection established; leaving degraded mode"
                );
                delay = INITIAL_DELAY;

                if !supervise(&state, store.as_ref()).await {
                    if policy == FallbackPolicy::Memory {
                        fall_back_to_memory(&state, "exhausted storage reconnect attempts")
                            .await;
                        return;
                    }
                    warn!("exhausted storage reconnect attempts; staying in degraded mode");
                    state.clear_room_store().await;
                }

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                if policy == FallbackPolicy::Memory {
                    fall_back_to_memory(&state, "storage unreachable at startup").await;
                    return;
                }
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll the store until reconnecting fails for good. Returns `false` then.
async fn supervise(state: &SharedState, store: &dyn RoomStore) -> bool {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                if !reconnect(state, store).await {
                    return false;
                }
                state.update_degraded(false);
                sleep(HEALTH_POLL_INTERVAL).await;
            }
        }
    }
}

async fn reconnect(state: &SharedState, store: &dyn RoomStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(reconnect_err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %reconnect_err,
                        "storage reconnect first attempt failed; entering in degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %reconnect_err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

async fn fall_back_to_memory(state: &SharedState, reason: &str) {
    warn!(
        reason,
        "falling back to in-memory room store; rooms and history will not survive a restart"
    );
    state
        .install_room_store(Arc::new(MemoryRoomStore::new()))
        .await;
}

#[cfg(test)]
mod tests {
    use std::io;

    use tokio::time::timeout;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn unreachable() -> StorageError {
        StorageError::unavailable("connect".into(), io::Error::other("connection refused"))
    }

    #[tokio::test]
    async fn failed_startup_falls_back_to_memory() {
        let state = AppState::new(&AppConfig::default());

        run(state.clone(), FallbackPolicy::Memory, || async {
            Err::<Arc<dyn RoomStore>, _>(unreachable())
        })
        .await;

        let store = state.room_store().await.unwrap();
        assert_eq!(store.kind(), "memory");
        assert!(!state.is_degraded());
    }

    #[tokio::test]
    async fn retry_policy_stays_degraded() {
        let state = AppState::new(&AppConfig::default());

        let supervisor = tokio::spawn(run(state.clone(), FallbackPolicy::Retry, || async {
            Err::<Arc<dyn RoomStore>, _>(unreachable())
        }));
        sleep(Duration::from_millis(100)).await;

        assert!(state.is_degraded());
        assert!(state.room_store().await.is_none());
        supervisor.abort();
    }

    #[tokio::test]
    async fn successful_connect_installs_store() {
        let state = AppState::new(&AppConfig::default());

        let supervisor = tokio::spawn(run(state.clone(), FallbackPolicy::Retry, || async {
            Ok::<Arc<dyn RoomStore>, StorageError>(Arc::new(MemoryRoomStore::new()))
        }));

        let mut watcher = state.degraded_watcher();
        timeout(Duration::from_secs(1), watcher.wait_for(|degraded| !degraded))
            .await
            .unwrap()
            .unwrap();
        assert!(state.room_store().await.is_some());
        supervisor.abort();
    }
}
