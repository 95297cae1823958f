use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod game;
pub mod health;
pub mod sse;
pub mod validation;
pub mod ws;

/// Render an epoch-milliseconds timestamp as RFC 3339 for outward payloads.
fn format_epoch_ms(ms: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
