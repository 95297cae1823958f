/// Game state document storage and retrieval operations.
pub mod game_store;
/// Persistence model definitions.
pub mod models;
/// Storage abstraction layer shared by all backends.
pub mod storage;
