use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Failures raised while parsing or validating a buzzer frame.
#[derive(Debug, Error)]
pub enum BuzzerMessageError {
    /// Frame was not valid JSON for the protocol.
    #[error("malformed buzzer message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A required identity field was empty.
    #[error("buzzer message field `{0}` must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from buzzer WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuzzerInboundMessage {
    /// First frame of a connection: who is holding this device.
    Identification {
        /// Team the device buzzes for.
        team_id: u32,
        /// Team name as configured on the device.
        team_name: String,
        /// Player holding the device.
        player_name: String,
    },
    /// A buzz attempt for the currently open question.
    Buzz,
    /// Any message type this build does not know about.
    #[serde(other)]
    Unknown,
}

impl BuzzerInboundMessage {
    /// Parse and validate a single frame coming from a buzzer device.
    pub fn from_json_str(payload: &str) -> Result<Self, BuzzerMessageError> {
        let message: Self = serde_json::from_str(payload)?;

        if let Self::Identification {
            team_name,
            player_name,
            ..
        } = &message
        {
            if team_name.trim().is_empty() {
                return Err(BuzzerMessageError::EmptyField("team_name"));
            }
            if player_name.trim().is_empty() {
                return Err(BuzzerMessageError::EmptyField("player_name"));
            }
        }

        Ok(message)
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Messages pushed to buzzer WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuzzerOutboundMessage {
    /// Positive acknowledgement after successful identification.
    Ack {
        /// Team the connection was registered for.
        team_id: u32,
    },
    /// Result of a buzz attempt; accepted exactly once per lock window.
    Feedback {
        /// Whether this device won the window.
        accepted: bool,
    },
    /// Gate state pushed whenever the buzzer lock opens or closes.
    Gate {
        /// Whether the gate is currently closed.
        locked: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identification_frame_parses() {
        let message = BuzzerInboundMessage::from_json_str(
            r#"{"type": "identification", "team_id": 1, "team_name": "Team Blue", "player_name": "Ada"}"#,
        )
        .unwrap();
        match message {
            BuzzerInboundMessage::Identification {
                team_id,
                team_name,
                player_name,
            } => {
                assert_eq!(team_id, 1);
                assert_eq!(team_name, "Team Blue");
                assert_eq!(player_name, "Ada");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn buzz_frame_parses() {
        let message = BuzzerInboundMessage::from_json_str(r#"{"type": "buzz"}"#).unwrap();
        assert!(matches!(message, BuzzerInboundMessage::Buzz));
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let message = BuzzerInboundMessage::from_json_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(message, BuzzerInboundMessage::Unknown));
    }

    #[test]
    fn empty_identity_fields_are_rejected() {
        let err = BuzzerInboundMessage::from_json_str(
            r#"{"type": "identification", "team_id": 1, "team_name": " ", "player_name": "Ada"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BuzzerMessageError::EmptyField("team_name")));

        assert!(BuzzerInboundMessage::from_json_str("not json").is_err());
    }
}
