use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        format_epoch_ms,
        validation::{validate_question_bank, validate_team_roster},
    },
    state::game::{
        AnswerHistoryEntry, BuzzRecord, BuzzerState, CurrentQuestion, GameState, Question,
        QuestionKind, Team,
    },
};

/// Payload opening a question on the board.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectQuestionRequest {
    /// Category the question belongs to.
    #[validate(length(min = 1))]
    pub category: String,
    /// Point value identifying the question within the category.
    pub value: u32,
}

/// Payload judging the currently open question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JudgeAnswerRequest {
    /// Whether the answer was ruled correct.
    pub correct: bool,
    /// Team being judged.
    pub team_id: u32,
    /// Points at stake; negative values are allowed.
    pub points: i64,
}

/// Payload for a manual score adjustment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustScoreRequest {
    /// Team whose score is adjusted.
    pub team_id: u32,
    /// Delta to apply; negative values decrease the score.
    pub points: i64,
}

/// Payload replacing the whole team roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateTeamsRequest {
    /// Replacement roster; ids must be unique and names non-empty.
    #[validate(custom(function = validate_team_roster))]
    pub teams: Vec<TeamInput>,
}

/// Incoming team definition for a wholesale roster replacement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamInput {
    /// Stable identifier, unique within the roster.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Starting score carried over with the replacement.
    #[serde(default)]
    pub score: i64,
    /// Display color hint.
    pub color: String,
    /// Display icon hint.
    pub icon: String,
    /// Whether the team takes part in the current round.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Optional reference to a team picture.
    #[serde(default)]
    pub picture: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Payload replacing the categories and question bank wholesale.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuestionsRequest {
    /// Replacement category names, in board order.
    pub categories: Vec<String>,
    /// Replacement question bank keyed by category.
    #[schema(value_type = Object)]
    pub questions: IndexMap<String, Vec<QuestionInput>>,
}

impl Validate for UpdateQuestionsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_question_bank(&self.categories, &self.questions) {
            errors.add("questions", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Incoming question definition for a wholesale bank replacement.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuestionInput {
    /// Point value, unique within its category.
    pub value: u32,
    /// Prompt read to the players.
    pub prompt: String,
    /// Answer the judge checks against.
    pub expected_answer: String,
    /// Question kind; defaults to `standard`.
    #[serde(default)]
    #[schema(value_type = String)]
    pub kind: QuestionKindDto,
    /// Answered flag; not preserved from the old bank unless supplied.
    #[serde(default)]
    pub answered: bool,
}

/// Wire representation of a question kind. Unrecognised kinds round-trip as
/// `unknown` instead of failing deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionKindDto {
    /// Plain prompt/answer question.
    #[default]
    Standard,
    /// Any kind this build does not know about.
    Unknown,
}

impl From<String> for QuestionKindDto {
    fn from(value: String) -> Self {
        match value.as_str() {
            "standard" => Self::Standard,
            _ => Self::Unknown,
        }
    }
}

impl From<QuestionKindDto> for String {
    fn from(value: QuestionKindDto) -> Self {
        match value {
            QuestionKindDto::Standard => "standard".to_string(),
            QuestionKindDto::Unknown => "unknown".to_string(),
        }
    }
}

/// Generic acknowledgement for operations that may be silently ignored.
///
/// Precondition failures (stale question, locked buzzer, unknown team) are
/// not errors: the response simply reports that nothing was applied.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Whether the operation mutated the game state.
    pub applied: bool,
}

impl ActionResponse {
    /// The operation was applied and broadcast.
    pub fn applied() -> Self {
        Self { applied: true }
    }

    /// The operation was dropped because a precondition failed.
    pub fn ignored() -> Self {
        Self { applied: false }
    }
}

/// Public projection of a team exposed to REST/SSE clients.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamSnapshot {
    /// Stable identifier.
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

/// Public projection of a board cell.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionSnapshot {
    /// Point value.
    pub value: u32,
    /// Prompt read to the players.
    pub prompt: String,
    /// Answer the judge checks against.
    pub expected_answer: String,
    /// Question kind.
    #[schema(value_type = String)]
    pub kind: QuestionKindDto,
    /// Whether the cell has been judged.
    pub answered: bool,
}

/// Public projection of the currently open question.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentQuestionSnapshot {
    /// Category the question was taken from.
    pub category: String,
    /// Point value.
    pub value: u32,
    /// Prompt read to the players.
    pub prompt: String,
    /// Answer the judge checks against.
    pub expected_answer: String,
    /// Question kind.
    #[schema(value_type = String)]
    pub kind: QuestionKindDto,
    /// Epoch milliseconds when the question was opened.
    pub selected_at: u64,
}

/// Public projection of an accepted buzz.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuzzRecordSnapshot {
    /// Team that buzzed in.
    pub team_id: u32,
    /// Team name as reported by the device.
    pub team_name: String,
    /// Player holding the device.
    pub player_name: String,
    /// Epoch milliseconds when the buzz was processed.
    pub timestamp: u64,
}

/// Public projection of the buzzer arbitration state.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuzzerSnapshot {
    /// Whether the gate is closed for the current window.
    pub locked: bool,
    /// The winning buzz, present exactly when `locked` is true.
    pub record: Option<BuzzRecordSnapshot>,
}

/// Public projection of a judged-answer history entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerHistorySnapshot {
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

/// Full snapshot of the game state sent to observers.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameStateSnapshot {
    /// Participating teams in display order.
    pub teams: Vec<TeamSnapshot>,
    /// Category names in board order.
    pub categories: Vec<String>,
    /// Question bank keyed by category.
    #[schema(value_type = Object)]
    pub questions: IndexMap<String, Vec<QuestionSnapshot>>,
    /// The question currently open, if any.
    pub current_question: Option<CurrentQuestionSnapshot>,
    /// Buzzer arbitration state.
    pub buzzer: BuzzerSnapshot,
    /// Most recent judged answers, newest first.
    pub answer_history: Vec<AnswerHistorySnapshot>,
    /// Whether the first question of the session has been opened.
    pub game_started: bool,
    /// RFC 3339 timestamp of the last applied mutation.
    pub last_update: String,
}

impl From<QuestionKind> for QuestionKindDto {
    fn from(value: QuestionKind) -> Self {
        match value {
            QuestionKind::Standard => Self::Standard,
            QuestionKind::Unknown => Self::Unknown,
        }
    }
}

impl From<QuestionKindDto> for QuestionKind {
    fn from(value: QuestionKindDto) -> Self {
        match value {
            QuestionKindDto::Standard => Self::Standard,
            QuestionKindDto::Unknown => Self::Unknown,
        }
    }
}

impl From<TeamInput> for Team {
    fn from(value: TeamInput) -> Self {
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

impl From<QuestionInput> for Question {
    fn from(value: QuestionInput) -> Self {
        Self {
            value: value.value,
            prompt: value.prompt,
            expected_answer: value.expected_answer,
            kind: value.kind.into(),
            answered: value.answered,
        }
    }
}

impl From<Team> for TeamSnapshot {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            name: team.name,
            score: team.score,
            color: team.color,
            icon: team.icon,
            active: team.active,
            picture: team.picture,
        }
    }
}

impl From<Question> for QuestionSnapshot {
    fn from(question: Question) -> Self {
        Self {
            value: question.value,
            prompt: question.prompt,
            expected_answer: question.expected_answer,
            kind: question.kind.into(),
            answered: question.answered,
        }
    }
}

impl From<CurrentQuestion> for CurrentQuestionSnapshot {
    fn from(current: CurrentQuestion) -> Self {
        Self {
            category: current.category,
            value: current.value,
            prompt: current.prompt,
            expected_answer: current.expected_answer,
            kind: current.kind.into(),
            selected_at: current.selected_at,
        }
    }
}

impl From<BuzzRecord> for BuzzRecordSnapshot {
    fn from(record: BuzzRecord) -> Self {
        Self {
            team_id: record.team_id,
            team_name: record.team_name,
            player_name: record.player_name,
            timestamp: record.timestamp,
        }
    }
}

impl From<BuzzerState> for BuzzerSnapshot {
    fn from(buzzer: BuzzerState) -> Self {
        Self {
            locked: buzzer.locked,
            record: buzzer.record.map(Into::into),
        }
    }
}

impl From<AnswerHistoryEntry> for AnswerHistorySnapshot {
    fn from(entry: AnswerHistoryEntry) -> Self {
        Self {
            team_name: entry.team_name,
            team_color: entry.team_color,
            category: entry.category,
            value: entry.value,
            correct: entry.correct,
            points_awarded: entry.points_awarded,
            timestamp: entry.timestamp,
        }
    }
}

impl From<GameState> for GameStateSnapshot {
    fn from(state: GameState) -> Self {
        Self {
            teams: state.teams.into_iter().map(Into::into).collect(),
            categories: state.categories,
            questions: state
                .questions
                .into_iter()
                .map(|(category, cells)| {
                    (category, cells.into_iter().map(Into::into).collect())
                })
                .collect(),
            current_question: state.current_question.map(Into::into),
            buzzer: state.buzzer.into(),
            answer_history: state.answer_history.into_iter().map(Into::into).collect(),
            game_started: state.game_started,
            last_update: format_epoch_ms(state.last_update),
        }
    }
}
