use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{game_store::GameStore, storage::StorageError},
    services::sse_events,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the storage backend, keep it healthy, and keep the shared
/// state in degraded mode whenever it is unavailable.
///
/// On every fresh connection the persisted game document is adopted when one
/// exists, otherwise the current in-memory state seeds it (create-if-absent
/// initialization). During a session the in-memory state stays the source of
/// truth; a reconnected backend is caught up with a snapshot write.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                if let Err(err) = hydrate(&state, store.as_ref()).await {
                    warn!(error = %err, "failed to hydrate game state from storage");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                    continue;
                }

                state.install_game_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                loop {
                    match store.health_check().await {
                        Ok(()) => {
                            if state.is_degraded().await {
                                info!("storage healthy again; leaving degraded mode");
                                state.install_game_store(store.clone()).await;
                            }
                            sleep(HEALTH_POLL_INTERVAL).await;
                        }
                        Err(_) => {
                            let mut attempt = 0;
                            let mut reconnect_delay = INITIAL_DELAY;
                            let mut reconnected = false;

                            while attempt < MAX_RECONNECT_ATTEMPTS {
                                match store.try_reconnect().await {
                                    Ok(()) => {
                                        info!(
                                            "storage reconnection succeeded after health check failure"
                                        );
                                        reconnected = true;
                                        break;
                                    }
                                    Err(reconnect_err) => {
                                        if attempt == 0 {
                                            warn!(
                                                attempt, error = %reconnect_err,
                                                "storage reconnect first attempt failed; entering degraded mode"
                                            );
                                            state.clear_game_store().await;
                                        } else {
                                            warn!(attempt, error = %reconnect_err, "storage reconnect attempt failed");
                                        }
                                        attempt += 1;
                                        sleep(reconnect_delay).await;
                                        reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                                    }
                                }
                            }

                            if reconnected {
                                state.install_game_store(store.clone()).await;
                                // Catch the backend up with whatever happened
                                // while it was away.
                                if let Err(err) =
                                    store.save_state(state.snapshot().await.into()).await
                                {
                                    warn!(error = %err, "failed to write snapshot after reconnect");
                                }
                                sleep(HEALTH_POLL_INTERVAL).await;
                                continue;
                            } else {
                                warn!(
                                    "exhausted storage reconnect attempts; staying in degraded mode"
                                );
                                state.clear_game_store().await;
                                break;
                            }
                        }
                    }
                }

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Adopt the persisted document when one exists, otherwise seed the backend
/// with the current in-memory state.
async fn hydrate(state: &SharedState, store: &dyn GameStore) -> Result<(), StorageError> {
    match store.load_state().await? {
        Some(entity) => {
            state.adopt(entity.into()).await;
            sse_events::broadcast_game_state(state, state.snapshot().await);
            info!("adopted persisted game state");
        }
        None => {
            store.save_state(state.snapshot().await.into()).await?;
            info!("seeded storage with a fresh game state document");
        }
    }
    Ok(())
}
