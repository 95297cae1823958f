use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::state::game::{
    AnswerHistoryEntry, BuzzRecord, BuzzerState, CurrentQuestion, GameState, Question,
    QuestionKind, Team,
};

/// Representation of a team inside the persisted game document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: i64,
    /// Display color hint.
    pub color: String,
    /// Display icon hint.
    pub icon: String,
    /// Whether the team takes part in the current round.
    pub active: bool,
    /// Optional reference to a team picture.
    pub picture: Option<String>,
}

/// Question kind as stored in the document; tolerant of future kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum QuestionKindEntity {
    /// Plain prompt/answer question.
    Standard,
    /// Any kind this build does not know about.
    Unknown,
}

impl From<String> for QuestionKindEntity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "standard" => Self::Standard,
            _ => Self::Unknown,
        }
    }
}

impl From<QuestionKindEntity> for String {
    fn from(value: QuestionKindEntity) -> Self {
        match value {
            QuestionKindEntity::Standard => "standard".to_string(),
            QuestionKindEntity::Unknown => "unknown".to_string(),
        }
    }
}

/// Representation of a board cell inside the persisted game document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Point value, unique within its category.
    pub value: u32,
    /// Prompt read to the players.
    pub prompt: String,
    /// Answer the judge checks against.
    pub expected_answer: String,
    /// Question kind.
    pub kind: QuestionKindEntity,
    /// Whether the cell has been judged.
    pub answered: bool,
}

/// Representation of the open question inside the persisted game document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentQuestionEntity {
    /// Category the question was taken from.
    pub category: String,
    /// Point value.
    pub value: u32,
    /// Prompt read to the players.
    pub prompt: String,
    /// Answer the judge checks against.
    pub expected_answer: String,
    /// Question kind.
    pub kind: QuestionKindEntity,
    /// Epoch milliseconds when the question was opened.
    pub selected_at: u64,
}

/// Representation of an accepted buzz inside the persisted game document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuzzRecordEntity {
    /// Team that buzzed in.
    pub team_id: u32,
    /// Team name as reported by the device.
    pub team_name: String,
    /// Player holding the device.
    pub player_name: String,
    /// Epoch milliseconds when the buzz was processed.
    pub timestamp: u64,
}

/// Representation of the buzzer state inside the persisted game document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuzzerStateEntity {
    /// Gate preventing more than one accepted buzz per window.
    pub locked: bool,
    /// The winning buzz, present exactly when `locked` is true.
    pub record: Option<BuzzRecordEntity>,
}

/// Representation of a judged answer inside the persisted game document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerHistoryEntryEntity {
    /// Name of the judged team at judging time.
    pub team_name: String,
    /// Color of the judged team at judging time.
    pub team_color: String,
    /// Category of the judged question.
    pub category: String,
    /// Point value of the judged question.
    pub value: u32,
    /// Whether the answer was ruled correct.
    pub correct: bool,
    /// Points actually awarded.
    pub points_awarded: i64,
    /// Epoch milliseconds when the answer was judged.
    pub timestamp: u64,
}

/// The full game state as one persisted document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateEntity {
    /// Participating teams in display order.
    pub teams: Vec<TeamEntity>,
    /// Category names in board order.
    pub categories: Vec<String>,
    /// Question bank keyed by category.
    pub questions: IndexMap<String, Vec<QuestionEntity>>,
    /// The question currently open, if any.
    pub current_question: Option<CurrentQuestionEntity>,
    /// Buzzer arbitration state.
    pub buzzer: BuzzerStateEntity,
    /// Most recent judged answers, newest first.
    pub answer_history: Vec<AnswerHistoryEntryEntity>,
    /// Whether the first question of the session has been opened.
    pub game_started: bool,
    /// Epoch milliseconds of the last applied mutation.
    pub last_update: u64,
}

impl From<QuestionKind> for QuestionKindEntity {
    fn from(value: QuestionKind) -> Self {
        match value {
            QuestionKind::Standard => Self::Standard,
            QuestionKind::Unknown => Self::Unknown,
        }
    }
}

impl From<QuestionKindEntity> for QuestionKind {
    fn from(value: QuestionKindEntity) -> Self {
        match value {
            QuestionKindEntity::Standard => Self::Standard,
            QuestionKindEntity::Unknown => Self::Unknown,
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
            color: value.color,
            icon: value.icon,
            active: value.active,
            picture: value.picture,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
            color: value.color,
            icon: value.icon,
            active: value.active,
            picture: value.picture,
        }
    }
}

impl From<Question> for QuestionEntity {
    fn from(value: Question) -> Self {
        Self {
            value: value.value,
            prompt: value.prompt,
            expected_answer: value.expected_answer,
            kind: value.kind.into(),
            answered: value.answered,
        }
    }
}

impl From<QuestionEntity> for Question {
    fn from(value: QuestionEntity) -> Self {
        Self {
            value: value.value,
            prompt: value.prompt,
            expected_answer: value.expected_answer,
            kind: value.kind.into(),
            answered: value.answered,
        }
    }
}

impl From<CurrentQuestion> for CurrentQuestionEntity {
    fn from(value: CurrentQuestion) -> Self {
        Self {
            category: value.category,
            value: value.value,
            prompt: value.prompt,
            expected_answer: value.expected_answer,
            kind: value.kind.into(),
            selected_at: value.selected_at,
        }
    }
}

impl From<CurrentQuestionEntity> for CurrentQuestion {
    fn from(value: CurrentQuestionEntity) -> Self {
        Self {
            category: value.category,
            value: value.value,
            prompt: value.prompt,
            expected_answer: value.expected_answer,
            kind: value.kind.into(),
            selected_at: value.selected_at,
        }
    }
}

impl From<BuzzRecord> for BuzzRecordEntity {
    fn from(value: BuzzRecord) -> Self {
        Self {
            team_id: value.team_id,
            team_name: value.team_name,
            player_name: value.player_name,
            timestamp: value.timestamp,
        }
    }
}

impl From<BuzzRecordEntity> for BuzzRecord {
    fn from(value: BuzzRecordEntity) -> Self {
        Self {
            team_id: value.team_id,
            team_name: value.team_name,
            player_name: value.player_name,
            timestamp: value.timestamp,
        }
    }
}

impl From<BuzzerState> for BuzzerStateEntity {
    fn from(value: BuzzerState) -> Self {
        Self {
            locked: value.locked,
            record: value.record.map(Into::into),
        }
    }
}

impl From<BuzzerStateEntity> for BuzzerState {
    fn from(value: BuzzerStateEntity) -> Self {
        Self {
            locked: value.locked,
            record: value.record.map(Into::into),
        }
    }
}

impl From<AnswerHistoryEntry> for AnswerHistoryEntryEntity {
    fn from(value: AnswerHistoryEntry) -> Self {
        Self {
            team_name: value.team_name,
            team_color: value.team_color,
            category: value.category,
            value: value.value,
            correct: value.correct,
            points_awarded: value.points_awarded,
            timestamp: value.timestamp,
        }
    }
}

impl From<AnswerHistoryEntryEntity> for AnswerHistoryEntry {
    fn from(value: AnswerHistoryEntryEntity) -> Self {
        Self {
            team_name: value.team_name,
            team_color: value.team_color,
            category: value.category,
            value: value.value,
            correct: value.correct,
            points_awarded: value.points_awarded,
            timestamp: value.timestamp,
        }
    }
}

impl From<GameState> for GameStateEntity {
    fn from(value: GameState) -> Self {
        Self {
            teams: value.teams.into_iter().map(Into::into).collect(),
            categories: value.categories,
            questions: value
                .questions
                .into_iter()
                .map(|(category, cells)| {
                    (category, cells.into_iter().map(Into::into).collect())
                })
                .collect(),
            current_question: value.current_question.map(Into::into),
            buzzer: value.buzzer.into(),
            answer_history: value.answer_history.into_iter().map(Into::into).collect(),
            game_started: value.game_started,
            last_update: value.last_update,
        }
    }
}

impl From<GameStateEntity> for GameState {
    fn from(value: GameStateEntity) -> Self {
        Self {
            teams: value.teams.into_iter().map(Into::into).collect(),
            categories: value.categories,
            questions: value
                .questions
                .into_iter()
                .map(|(category, cells)| {
                    (category, cells.into_iter().map(Into::into).collect())
                })
                .collect(),
            current_question: value.current_question.map(Into::into),
            buzzer: value.buzzer.into(),
            answer_history: value.answer_history.into_iter().map(Into::into).collect(),
            game_started: value.game_started,
            last_update: value.last_update,
        }
    }
}
