use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    services::{game_service, sse_events, sse_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/events",
    tag = "sse",
    responses((status = 200, description = "Observer event stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime game events to a connected observer, starting with a
/// full snapshot of the current state.
pub async fn events_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!("new observer SSE connection");
    let snapshot = game_service::current_snapshot(&state).await;
    sse_service::to_sse_stream(sse_events::game_state_event(&snapshot), receiver)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/events", get(events_stream))
}
