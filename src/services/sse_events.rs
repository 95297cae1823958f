use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        game::GameStateSnapshot,
        sse::{
            AnswerJudgedEvent, BuzzerPressedEvent, BuzzerResetEvent, QuestionClosedEvent,
            QuestionSelectedEvent, ServerEvent, SystemStatus,
        },
    },
    state::{
        SharedState,
        game::{BuzzRecord, CurrentQuestion, GameState, JudgedAnswer},
    },
};

const EVENT_GAME_STATE: &str = "game.state";
const EVENT_QUESTION_SELECTED: &str = "question.selected";
const EVENT_BUZZER_PRESSED: &str = "buzzer.pressed";
const EVENT_ANSWER_JUDGED: &str = "answer.judged";
const EVENT_QUESTION_CLOSED: &str = "question.closed";
const EVENT_BUZZER_RESET: &str = "buzzer.reset";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast the full state snapshot; every narrow event below is followed
/// by one of these so late joiners and lagged observers converge.
pub fn broadcast_game_state(state: &SharedState, snapshot: GameState) {
    let payload: GameStateSnapshot = snapshot.into();
    send_event(state, EVENT_GAME_STATE, &payload);
}

/// Build the full-state event pushed to an observer right after it connects.
pub fn game_state_event(snapshot: &GameStateSnapshot) -> Option<ServerEvent> {
    match ServerEvent::json(Some(EVENT_GAME_STATE.to_string()), snapshot) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize connect snapshot");
            None
        }
    }
}

/// Broadcast that a question has been opened on the board.
pub fn broadcast_question_selected(state: &SharedState, current: CurrentQuestion) {
    let payload = QuestionSelectedEvent {
        question: current.into(),
    };
    send_event(state, EVENT_QUESTION_SELECTED, &payload);
}

/// Broadcast the winning buzz of the current lock window.
pub fn broadcast_buzzer_pressed(state: &SharedState, record: BuzzRecord) {
    let payload = BuzzerPressedEvent {
        record: record.into(),
    };
    send_event(state, EVENT_BUZZER_PRESSED, &payload);
}

/// Broadcast the outcome of a judged answer.
pub fn broadcast_answer_judged(state: &SharedState, judged: &JudgedAnswer) {
    let payload = AnswerJudgedEvent {
        correct: judged.correct,
        team_id: judged.team_id,
        team_name: judged.team_name.clone(),
        points: judged.points_awarded,
        new_score: judged.new_score,
    };
    send_event(state, EVENT_ANSWER_JUDGED, &payload);
}

/// Broadcast that the open question was dismissed without judging.
pub fn broadcast_question_closed(state: &SharedState) {
    send_event(state, EVENT_QUESTION_CLOSED, &QuestionClosedEvent {});
}

/// Broadcast that the buzzer gate reopened for the current question.
pub fn broadcast_buzzer_reset(state: &SharedState) {
    send_event(state, EVENT_BUZZER_RESET, &BuzzerResetEvent {});
}

/// Broadcast the degraded-mode flag.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Forward degraded-mode flips from the storage supervisor to observers.
/// Runs for the lifetime of the process.
pub async fn watch_degraded(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    loop {
        if watcher.changed().await.is_err() {
            break;
        }
        let degraded = *watcher.borrow_and_update();
        broadcast_system_status(&state, degraded);
    }
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.events().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
