//! Time source for window evaluation.

use chrono::{DateTime, Timelike, Utc};

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC hour (0-23).
    fn current_hour(&self) -> i32 {
        // hour() is always within 0..=23
        self.now().hour() as i32
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
