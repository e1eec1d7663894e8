//! Ports that exist to keep time deterministic in tests.

use chrono::{DateTime, Utc};

/// Clock abstraction so finalize timestamps can be pinned in tests.
#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
