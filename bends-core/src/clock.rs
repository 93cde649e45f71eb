//! Recency clock: the single source of "now" for classification.
//!
//! Kept behind a trait so the classifier can be driven by a fixed instant in
//! tests and by the wall clock in production.

use chrono::{DateTime, Duration, Utc};

/// How far back a build may lie and still count as recent.
pub fn recency_window() -> Duration {
    Duration::weeks(1)
}

pub trait RecencyClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Look-back window applied to every scan. Fixed at one week.
    fn window(&self) -> Duration {
        recency_window()
    }
}

/// Reads the system wall clock on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl RecencyClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl RecencyClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
