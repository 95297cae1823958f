use indexmap::IndexMap;
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    dto::game::{
        AdjustScoreRequest, GameStateSnapshot, JudgeAnswerRequest, SelectQuestionRequest,
        UpdateQuestionsRequest, UpdateTeamsRequest,
    },
    error::ServiceError,
    services::{sse_events, websocket_service},
    state::{
        BuzzerIdentity, SharedState, now_ms,
        game::{GameState, Question, Team},
    },
};

/// Full snapshot of the current game state for polling clients and the SSE
/// connect push.
pub async fn current_snapshot(state: &SharedState) -> GameStateSnapshot {
    state.snapshot().await.into()
}

/// Open a question on the board. Returns whether the operation applied.
pub async fn select_question(
    state: &SharedState,
    request: SelectQuestionRequest,
) -> Result<bool, ServiceError> {
    request.validate().map_err(ServiceError::from)?;

    let now = now_ms();
    let outcome = state
        .mutate(|game| {
            game.select_question(&request.category, request.value, now)
                .map(|current| (current, game.clone()))
        })
        .await;

    match outcome {
        Some((current, snapshot)) => {
            sse_events::broadcast_question_selected(state, current);
            websocket_service::notify_buzzer_gate(state, false);
            finish_mutation(state, snapshot);
            Ok(true)
        }
        None => {
            debug!(
                category = %request.category,
                value = request.value,
                "ignoring selection of unknown or answered question"
            );
            Ok(false)
        }
    }
}

/// Dismiss the open question without judging it. Always applies.
pub async fn close_question(state: &SharedState) {
    let now = now_ms();
    let snapshot = state
        .mutate(|game| {
            game.close_question(now);
            game.clone()
        })
        .await;

    sse_events::broadcast_question_closed(state);
    websocket_service::notify_buzzer_gate(state, false);
    finish_mutation(state, snapshot);
}

/// Process a buzz for the registered identity. Returns whether this press
/// won the lock window; losing presses are dropped silently.
pub async fn press_buzzer(state: &SharedState, identity: &BuzzerIdentity) -> bool {
    let now = now_ms();
    let outcome = state
        .mutate(|game| {
            game.press_buzzer(
                identity.team_id,
                &identity.team_name,
                &identity.player_name,
                now,
            )
            .map(|record| (record, game.clone()))
        })
        .await;

    match outcome {
        Some((record, snapshot)) => {
            sse_events::broadcast_buzzer_pressed(state, record);
            websocket_service::notify_buzzer_gate(state, true);
            finish_mutation(state, snapshot);
            true
        }
        None => {
            debug!(
                team = %identity.team_name,
                player = %identity.player_name,
                "ignoring buzz: gate locked or no open question"
            );
            false
        }
    }
}

/// Reopen the buzzer gate for the current question. Always applies.
pub async fn reset_buzzer(state: &SharedState) {
    let now = now_ms();
    let snapshot = state
        .mutate(|game| {
            game.reset_buzzer(now);
            game.clone()
        })
        .await;

    sse_events::broadcast_buzzer_reset(state);
    websocket_service::notify_buzzer_gate(state, false);
    finish_mutation(state, snapshot);
}

/// Judge the open question. Returns whether the operation applied.
pub async fn judge_answer(state: &SharedState, request: JudgeAnswerRequest) -> bool {
    let now = now_ms();
    let outcome = state
        .mutate(|game| {
            game.judge_answer(request.correct, request.team_id, request.points, now)
                .map(|judged| (judged, game.clone()))
        })
        .await;

    match outcome {
        Some((judged, snapshot)) => {
            sse_events::broadcast_answer_judged(state, &judged);
            websocket_service::notify_buzzer_gate(state, false);
            finish_mutation(state, snapshot);
            true
        }
        None => {
            debug!(
                team_id = request.team_id,
                "ignoring judgment: no open question or unknown team"
            );
            false
        }
    }
}

/// Manually adjust a team's score. Returns whether the operation applied.
pub async fn adjust_score(state: &SharedState, request: AdjustScoreRequest) -> bool {
    let now = now_ms();
    let outcome = state
        .mutate(|game| {
            game.adjust_score(request.team_id, request.points, now)
                .map(|new_score| (new_score, game.clone()))
        })
        .await;

    match outcome {
        Some((_, snapshot)) => {
            finish_mutation(state, snapshot);
            true
        }
        None => {
            debug!(team_id = request.team_id, "ignoring adjustment for unknown team");
            false
        }
    }
}

/// Replace the whole team roster after validating it.
pub async fn update_teams(
    state: &SharedState,
    request: UpdateTeamsRequest,
) -> Result<GameStateSnapshot, ServiceError> {
    request.validate().map_err(ServiceError::from)?;

    let teams: Vec<Team> = request.teams.into_iter().map(Into::into).collect();
    let now = now_ms();
    let snapshot = state
        .mutate(|game| {
            game.replace_teams(teams, now);
            game.clone()
        })
        .await;

    finish_mutation(state, snapshot.clone());
    Ok(snapshot.into())
}

/// Replace the categories and question bank after validating them.
pub async fn update_questions(
    state: &SharedState,
    request: UpdateQuestionsRequest,
) -> Result<GameStateSnapshot, ServiceError> {
    request.validate().map_err(ServiceError::from)?;

    let UpdateQuestionsRequest {
        categories,
        mut questions,
    } = request;

    // Rebuild the bank in board order; validation guarantees the key sets
    // match, the fallback only guards against the impossible.
    let bank: IndexMap<String, Vec<Question>> = categories
        .iter()
        .map(|category| {
            let cells = questions
                .shift_remove(category)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect();
            (category.clone(), cells)
        })
        .collect();

    let now = now_ms();
    let snapshot = state
        .mutate(|game| {
            game.replace_questions(categories, bank, now);
            game.clone()
        })
        .await;

    finish_mutation(state, snapshot.clone());
    Ok(snapshot.into())
}

/// Reset scores, history, and the question bank while keeping team identity.
pub async fn reset_game(state: &SharedState) -> GameStateSnapshot {
    let now = now_ms();
    let snapshot = state
        .mutate(|game| {
            game.reset_game(state.config(), now);
            game.clone()
        })
        .await;

    websocket_service::notify_buzzer_gate(state, false);
    finish_mutation(state, snapshot.clone());
    snapshot.into()
}

/// Broadcast the post-mutation snapshot and persist it in the background.
fn finish_mutation(state: &SharedState, snapshot: GameState) {
    sse_events::broadcast_game_state(state, snapshot.clone());
    persist_state(state, snapshot);
}

/// Hand the snapshot to the document store on a detached task; a slow or
/// absent backend never blocks or rolls back the mutation.
fn persist_state(state: &SharedState, snapshot: GameState) {
    let state = state.clone();
    tokio::spawn(async move {
        let Some(store) = state.game_store().await else {
            return;
        };
        if let Err(err) = store.save_state(snapshot.into()).await {
            warn!(error = %err, "failed to persist game state");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};
    use tokio::sync::broadcast::error::TryRecvError;

    fn identity(team_id: u32) -> BuzzerIdentity {
        BuzzerIdentity {
            team_id,
            team_name: format!("Team {team_id}"),
            player_name: "Player".into(),
        }
    }

    #[tokio::test]
    async fn concurrent_presses_produce_exactly_one_winner() {
        let state = AppState::new(AppConfig::default());
        assert!(
            select_question(
                &state,
                SelectQuestionRequest {
                    category: "Science".into(),
                    value: 100,
                },
            )
            .await
            .unwrap()
        );

        let mut tasks = Vec::new();
        for team_id in 1..=3 {
            for _ in 0..4 {
                let state = state.clone();
                tasks.push(tokio::spawn(async move {
                    press_buzzer(&state, &identity(team_id)).await
                }));
            }
        }

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        let snapshot = state.snapshot().await;
        assert!(snapshot.buzzer.locked);
        assert!(snapshot.buzzer.record.is_some());
    }

    #[tokio::test]
    async fn ignored_operations_broadcast_nothing() {
        let state = AppState::new(AppConfig::default());
        let mut receiver = state.events().subscribe();

        // Unknown team: silently ignored.
        assert!(
            !adjust_score(
                &state,
                AdjustScoreRequest {
                    team_id: 99,
                    points: 100,
                },
            )
            .await
        );
        // Unknown question: silently ignored.
        assert!(
            !select_question(
                &state,
                SelectQuestionRequest {
                    category: "Botany".into(),
                    value: 100,
                },
            )
            .await
            .unwrap()
        );
        // Buzz with no open question: silently ignored.
        assert!(!press_buzzer(&state, &identity(1)).await);
        // Judging with no open question: silently ignored.
        assert!(
            !judge_answer(
                &state,
                JudgeAnswerRequest {
                    correct: true,
                    team_id: 1,
                    points: 100,
                },
            )
            .await
        );

        assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn applied_operation_broadcasts_event_then_full_state() {
        let state = AppState::new(AppConfig::default());
        let mut receiver = state.events().subscribe();

        assert!(
            select_question(
                &state,
                SelectQuestionRequest {
                    category: "Science".into(),
                    value: 100,
                },
            )
            .await
            .unwrap()
        );

        let first = receiver.try_recv().unwrap();
        assert_eq!(first.event.as_deref(), Some("question.selected"));
        let second = receiver.try_recv().unwrap();
        assert_eq!(second.event.as_deref(), Some("game.state"));
    }

    #[tokio::test]
    async fn update_teams_rejects_duplicate_ids() {
        use crate::dto::game::TeamInput;

        let state = AppState::new(AppConfig::default());
        let duplicate = UpdateTeamsRequest {
            teams: vec![
                TeamInput {
                    id: 1,
                    name: "Blue".into(),
                    score: 0,
                    color: "#3b82f6".into(),
                    icon: "B".into(),
                    active: true,
                    picture: None,
                },
                TeamInput {
                    id: 1,
                    name: "Red".into(),
                    score: 0,
                    color: "#ef4444".into(),
                    icon: "R".into(),
                    active: true,
                    picture: None,
                },
            ],
        };

        let err = update_teams(&state, duplicate).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        // The roster is untouched.
        assert_eq!(state.snapshot().await.teams.len(), 3);
    }
}
