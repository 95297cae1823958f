use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::game::{BuzzRecordSnapshot, CurrentQuestionSnapshot};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Pre-serialized SSE data field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    /// True while no storage backend is connected.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a question is opened on the board.
pub struct QuestionSelectedEvent {
    /// The question that is now open.
    pub question: CurrentQuestionSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the first buzz of a lock window is accepted.
pub struct BuzzerPressedEvent {
    /// The winning buzz.
    pub record: BuzzRecordSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the open question has been judged.
pub struct AnswerJudgedEvent {
    /// Whether the answer was ruled correct.
    pub correct: bool,
    /// Team that was judged.
    pub team_id: u32,
    /// Name of the judged team.
    pub team_name: String,
    /// Points actually awarded.
    pub points: i64,
    /// Team score after the award.
    pub new_score: i64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the open question is dismissed without judging.
pub struct QuestionClosedEvent {}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the buzzer gate reopens for the current question.
pub struct BuzzerResetEvent {}
