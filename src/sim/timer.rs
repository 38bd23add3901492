//! Periodic timer bound to a run horizon.

use super::time::{duration_nanos, SimTime};
use std::time::Duration;

/// A timer that expires at `start + k * period` for `k = 0, 1, ...`.
///
/// The horizon fixes the number of expirations up front:
/// `floor((horizon - start) / period)`. An expiration at or past the horizon
/// never happens, and a zero period never expires at all.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    start: SimTime,
    period: Duration,
    limit: u64,
    expired: u64,
}

impl PeriodicTimer {
    pub fn new(start: SimTime, period: Duration, horizon: SimTime) -> Self {
        let period_nanos = duration_nanos(period);
        let span = horizon.as_nanos().saturating_sub(start.as_nanos());
        let limit = if period_nanos == 0 { 0 } else { span / period_nanos };
        PeriodicTimer {
            start,
            period,
            limit,
            expired: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Total number of expirations this timer will ever produce.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn expired(&self) -> u64 {
        self.expired
    }

    /// Deadline of the next expiration, if the horizon leaves room for one.
    pub fn deadline(&self) -> Option<SimTime> {
        if self.expired >= self.limit {
            return None;
        }
        let offset = duration_nanos(self.period).saturating_mul(self.expired);
        Some(SimTime::from_nanos(self.start.as_nanos().saturating_add(offset)))
    }

    /// Record one expiration and return the deadline to rearm at, if any.
    pub fn expire(&mut self) -> Option<SimTime> {
        if self.expired < self.limit {
            self.expired += 1;
        }
        self.deadline()
    }
}
