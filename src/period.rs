//! Time-bucketed selection for "raccoon of the day" and "raccoon of the hour".
//!
//! Pure over the supplied timestamp: callers pass `Utc::now()`, tests pass
//! fixed instants.

use chrono::{DateTime, Datelike, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Hourly,
}

impl Period {
    fn seed(self, now: DateTime<Utc>) -> u64 {
        let base = now.year().unsigned_abs() as u64 + u64::from(now.month0()) + u64::from(now.day());
        match self {
            Period::Daily => base,
            Period::Hourly => base + u64::from(now.hour()),
        }
    }
}

/// Index for the bucket containing `now`, within `[1, count)`; `1` when `count <= 1`.
pub fn period_index(now: DateTime<Utc>, period: Period, count: u32) -> u32 {
    if count <= 1 {
        return 1;
    }
    let span = u64::from(count - 1);
    (period.seed(now) % span) as u32 + 1
}
