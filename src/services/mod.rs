/// OpenAPI documentation generation.
pub mod documentation;
/// Core game operations: apply, broadcast, persist.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor with reconnect and backoff.
pub mod storage_supervisor;
/// WebSocket connection and message handling for buzzer devices.
pub mod websocket_service;
