//! # Query window
//! Pure computation of the `[from, to]` bounds sent to the news API.
//!
//! `to = now - delay`, `from = now - (delay + period)`, both pulled back one more
//! second so an article stamped exactly on the boundary is not excluded.

use chrono::{DateTime, Duration, Utc};

/// Wire format expected by the news API (milliseconds pinned to `.000`).
pub const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Source of "now". Injected so the relay can be driven with a fixed instant in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Bounds that would fall before the earliest representable instant saturate to it.
    pub fn at(now: DateTime<Utc>, delay_hours: u32, period_hours: u32) -> Self {
        let to = back(now, Duration::hours(i64::from(delay_hours)) + Duration::seconds(1));
        let from = back(to, Duration::hours(i64::from(period_hours)));
        Self { from, to }
    }

    pub fn compute(clock: &dyn Clock, delay_hours: u32, period_hours: u32) -> Self {
        Self::at(clock.now(), delay_hours, period_hours)
    }

    pub fn from_param(&self) -> String {
        self.from.format(WINDOW_FORMAT).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(WINDOW_FORMAT).to_string()
    }
}

fn back(t: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    t.checked_sub_signed(by).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
