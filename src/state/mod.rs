pub mod game;
mod sse;

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc, watch};
use uuid::Uuid;

use crate::{config::AppConfig, dao::game_store::GameStore, state::game::GameState};

pub use self::sse::SseHub;

/// Cheaply clonable handle on the central application state.
pub type SharedState = Arc<AppState>;

/// Identity a buzzer device registers during its WebSocket handshake.
#[derive(Debug, Clone)]
pub struct BuzzerIdentity {
    /// Team the device buzzes for.
    pub team_id: u32,
    /// Team name as configured on the device.
    pub team_name: String,
    /// Player holding the device.
    pub player_name: String,
}

#[derive(Clone)]
/// Handle used to push messages to a connected buzzer device.
pub struct BuzzerConnection {
    /// Connection identifier, unique per socket.
    pub id: Uuid,
    /// Identity registered by the device.
    pub identity: BuzzerIdentity,
    /// Outbound channel towards the device's writer task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state owning the canonical game state, the observer
/// broadcast hub, the buzzer connection registry, and the storage handle.
///
/// The game state is the single source of truth; every mutation runs inside
/// [`AppState::mutate`], whose write lock serializes check-and-effect so no
/// operation ever observes a partially applied one.
pub struct AppState {
    config: AppConfig,
    game: RwLock<GameState>,
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    events: SseHub,
    buzzers: DashMap<Uuid, BuzzerConnection>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let game = GameState::new(&config, now_ms());
        Arc::new(Self {
            config,
            game: RwLock::new(game),
            game_store: RwLock::new(None),
            events: SseHub::new(16),
            buzzers: DashMap::new(),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Clone the current game state for read-only use.
    pub async fn snapshot(&self) -> GameState {
        self.game.read().await.clone()
    }

    /// Run one store operation inside the serialized critical section.
    ///
    /// The write lock is the single-writer gate from the concurrency model:
    /// precondition checks and effects happen under the same guard, which is
    /// what makes buzzer arbitration first-processed-wins.
    pub async fn mutate<T>(&self, op: impl FnOnce(&mut GameState) -> T) -> T {
        let mut guard = self.game.write().await;
        op(&mut guard)
    }

    /// Replace the in-memory state wholesale (used when adopting a persisted
    /// document on storage connect).
    pub async fn adopt(&self, next: GameState) {
        let mut guard = self.game.write().await;
        *guard = next;
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn install_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current game store and enter degraded mode.
    pub async fn clear_game_store(&self) {
        {
            let mut guard = self.game_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.game_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the observer SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }

    /// Registry of active buzzer sockets keyed by connection id.
    pub fn buzzers(&self) -> &DashMap<Uuid, BuzzerConnection> {
        &self.buzzers
    }

    /// Broadcast the degraded flag when the value changes.
    fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
