use serde::{Deserialize, Serialize};

use crate::dao::models::GameStateEntity;

/// Well-known identifier of the single game state document.
pub const STATE_DOC_ID: &str = "game-state";

/// CouchDB envelope around the persisted game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchStateDocument {
    /// CouchDB document identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// CouchDB revision, absent on first write.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// The game state itself, flattened into the document body.
    #[serde(flatten)]
    pub state: GameStateEntity,
}

impl CouchStateDocument {
    /// Wrap a state entity into a fresh document without a revision.
    pub fn from_entity(state: GameStateEntity) -> Self {
        Self {
            id: STATE_DOC_ID.to_string(),
            rev: None,
            state,
        }
    }

    /// Unwrap the state entity, discarding CouchDB metadata.
    pub fn into_entity(self) -> GameStateEntity {
        self.state
    }
}
