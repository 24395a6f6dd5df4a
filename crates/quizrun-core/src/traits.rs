//! Seams the engine depends on but does not own.

use chrono::{DateTime, Utc};

/// Source of wall-clock time for session timestamps.
///
/// Injected so tests can pin `started_at`/`finished_at` and assert exact
/// elapsed values.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
