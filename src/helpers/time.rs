use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Monotonic clock for probe timing. Follows tokio's clock, so a paused test
/// runtime controls it too.
pub fn get_instant() -> Instant {
    Instant::now()
}
