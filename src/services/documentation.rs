use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the quiz board backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::events_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::game::get_state,
        crate::routes::game::select_question,
        crate::routes::game::close_question,
        crate::routes::game::judge_answer,
        crate::routes::game::adjust_score,
        crate::routes::game::update_teams,
        crate::routes::game::update_questions,
        crate::routes::game::reset_buzzer,
        crate::routes::game::reset_game,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::ActionResponse,
            crate::dto::game::SelectQuestionRequest,
            crate::dto::game::JudgeAnswerRequest,
            crate::dto::game::AdjustScoreRequest,
            crate::dto::game::UpdateTeamsRequest,
            crate::dto::game::UpdateQuestionsRequest,
            crate::dto::game::TeamInput,
            crate::dto::game::QuestionInput,
            crate::dto::game::GameStateSnapshot,
            crate::dto::game::TeamSnapshot,
            crate::dto::game::QuestionSnapshot,
            crate::dto::game::CurrentQuestionSnapshot,
            crate::dto::game::BuzzRecordSnapshot,
            crate::dto::game::BuzzerSnapshot,
            crate::dto::game::AnswerHistorySnapshot,
            crate::dto::ws::BuzzerInboundMessage,
            crate::dto::ws::BuzzerOutboundMessage,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::QuestionSelectedEvent,
            crate::dto::sse::BuzzerPressedEvent,
            crate::dto::sse::AnswerJudgedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream for observers"),
        (name = "buzzers", description = "WebSocket operations for buzzer devices"),
        (name = "game", description = "Host and judge operations on the shared game state"),
    )
)]
pub struct ApiDoc;
