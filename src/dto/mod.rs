use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Answer submission payloads.
pub mod game;
/// Health endpoint payload.
pub mod health;
/// Finished-game records.
pub mod history;
/// Room lifecycle payloads and snapshots.
pub mod room;
/// Payloads pushed on room event streams.
pub mod sse;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
