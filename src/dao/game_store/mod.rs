#[cfg(feature = "couch-store")]
pub mod couchdb;

use futures::future::BoxFuture;

use crate::dao::{models::GameStateEntity, storage::StorageResult};

/// Abstraction over the persistence layer for the shared game document.
///
/// The canonical state is a single JSON-shaped document; the backend only
/// needs to read it, write it wholesale, and report its own health.
pub trait GameStore: Send + Sync {
    /// Read the persisted game document, if one exists.
    fn load_state(&self) -> BoxFuture<'static, StorageResult<Option<GameStateEntity>>>;
    /// Write the full game document, replacing the previous revision.
    fn save_state(&self, state: GameStateEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap liveness probe against the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish the backend connection after a failure.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
