//! Wall-clock budget for the search phase.

use std::time::{Duration, Instant};

/// Default search budget.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);

/// A fixed wall-clock budget, turned into a [`Deadline`] when a search starts.
///
/// ```
/// use std::time::Duration;
/// use tour_optimizer::termination::TimeBudget;
///
/// let budget = TimeBudget::millis(250);
/// let deadline = budget.start();
/// assert!(deadline.remaining() <= Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBudget {
    limit: Duration,
}

impl TimeBudget {
    pub fn new(limit: Duration) -> Self {
        TimeBudget { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Start the clock.
    pub fn start(&self) -> Deadline {
        Deadline {
            started: Instant::now(),
            limit: self.limit,
        }
    }
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_LIMIT)
    }
}

/// A running budget. Searches poll it at loop boundaries only.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.started.elapsed() >= self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }
}
