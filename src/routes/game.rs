use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::game::{
        ActionResponse, AdjustScoreRequest, GameStateSnapshot, JudgeAnswerRequest,
        SelectQuestionRequest, UpdateQuestionsRequest, UpdateTeamsRequest,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Host and judge endpoints driving the shared game state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/game/state", get(get_state))
        .route("/game/question/select", post(select_question))
        .route("/game/question/close", post(close_question))
        .route("/game/judge", post(judge_answer))
        .route("/game/score", post(adjust_score))
        .route("/game/teams", post(update_teams))
        .route("/game/questions", post(update_questions))
        .route("/game/buzzer/reset", post(reset_buzzer))
        .route("/game/reset", post(reset_game))
}

#[utoipa::path(
    get,
    path = "/game/state",
    tag = "game",
    responses((status = 200, description = "Full game state snapshot", body = GameStateSnapshot))
)]
/// Return the full current game state for polling clients.
pub async fn get_state(State(state): State<SharedState>) -> Json<GameStateSnapshot> {
    Json(game_service::current_snapshot(&state).await)
}

#[utoipa::path(
    post,
    path = "/game/question/select",
    tag = "game",
    request_body = SelectQuestionRequest,
    responses(
        (status = 200, description = "Selection processed; `applied` is false for unknown or answered questions", body = ActionResponse),
        (status = 400, description = "Malformed payload")
    )
)]
/// Open a question on the board.
pub async fn select_question(
    State(state): State<SharedState>,
    Json(payload): Json<SelectQuestionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let applied = game_service::select_question(&state, payload).await?;
    Ok(Json(if applied {
        ActionResponse::applied()
    } else {
        ActionResponse::ignored()
    }))
}

#[utoipa::path(
    post,
    path = "/game/question/close",
    tag = "game",
    responses((status = 200, description = "Open question dismissed", body = ActionResponse))
)]
/// Dismiss the open question without judging it.
pub async fn close_question(State(state): State<SharedState>) -> Json<ActionResponse> {
    game_service::close_question(&state).await;
    Json(ActionResponse::applied())
}

#[utoipa::path(
    post,
    path = "/game/judge",
    tag = "game",
    request_body = JudgeAnswerRequest,
    responses(
        (status = 200, description = "Judgment processed; `applied` is false without an open question or known team", body = ActionResponse),
        (status = 400, description = "Malformed payload")
    )
)]
/// Judge the currently open question for a team.
pub async fn judge_answer(
    State(state): State<SharedState>,
    Json(payload): Json<JudgeAnswerRequest>,
) -> Json<ActionResponse> {
    let applied = game_service::judge_answer(&state, payload).await;
    Json(if applied {
        ActionResponse::applied()
    } else {
        ActionResponse::ignored()
    })
}

#[utoipa::path(
    post,
    path = "/game/score",
    tag = "game",
    request_body = AdjustScoreRequest,
    responses(
        (status = 200, description = "Adjustment processed; `applied` is false for an unknown team", body = ActionResponse),
        (status = 400, description = "Malformed payload")
    )
)]
/// Manually adjust a team's score.
pub async fn adjust_score(
    State(state): State<SharedState>,
    Json(payload): Json<AdjustScoreRequest>,
) -> Json<ActionResponse> {
    let applied = game_service::adjust_score(&state, payload).await;
    Json(if applied {
        ActionResponse::applied()
    } else {
        ActionResponse::ignored()
    })
}

#[utoipa::path(
    post,
    path = "/game/teams",
    tag = "game",
    request_body = UpdateTeamsRequest,
    responses(
        (status = 200, description = "Roster replaced", body = GameStateSnapshot),
        (status = 400, description = "Malformed or inconsistent roster")
    )
)]
/// Replace the whole team roster.
pub async fn update_teams(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateTeamsRequest>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    let snapshot = game_service::update_teams(&state, payload).await?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/game/questions",
    tag = "game",
    request_body = UpdateQuestionsRequest,
    responses(
        (status = 200, description = "Categories and question bank replaced", body = GameStateSnapshot),
        (status = 400, description = "Malformed or inconsistent question bank")
    )
)]
/// Replace the categories and the question bank wholesale.
pub async fn update_questions(
    State(state): State<SharedState>,
    Json(payload): Json<UpdateQuestionsRequest>,
) -> Result<Json<GameStateSnapshot>, AppError> {
    let snapshot = game_service::update_questions(&state, payload).await?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/game/buzzer/reset",
    tag = "game",
    responses((status = 200, description = "Buzzer gate reopened", body = ActionResponse))
)]
/// Reopen the buzzer gate without touching the current question.
pub async fn reset_buzzer(State(state): State<SharedState>) -> Json<ActionResponse> {
    game_service::reset_buzzer(&state).await;
    Json(ActionResponse::applied())
}

#[utoipa::path(
    post,
    path = "/game/reset",
    tag = "game",
    responses((status = 200, description = "Game reset to the default bank with zeroed scores", body = GameStateSnapshot))
)]
/// Reset the game while preserving team identities.
pub async fn reset_game(State(state): State<SharedState>) -> Json<GameStateSnapshot> {
    Json(game_service::reset_game(&state).await)
}
