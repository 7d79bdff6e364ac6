//! Duration Threshold
//!
//! Minimum wait interval between sweeps of the same address.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Duration component kinds, used when validating user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationComponent {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
}

/// Check a single duration component against its input cap.
///
/// The caps are independent per component (31 days and 5 weeks is fine);
/// they bound what a user may type, not a normalized calendar duration.
pub fn is_valid_component(kind: DurationComponent, value: u32) -> bool {
    match kind {
        DurationComponent::Years => true,
        DurationComponent::Months => value <= 12,
        DurationComponent::Weeks => value <= 52,
        DurationComponent::Days => value <= 31,
        DurationComponent::Hours => value <= 24,
    }
}

/// Minimum time that must pass between sweeps.
///
/// Comparison is deliberately naive: a year counts as 365 days and a month
/// as 30. Sweep intervals are expected to be short enough that calendar
/// accuracy does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationThreshold {
    years: u32,
    months: u32,
    weeks: u32,
    days: u32,
    hours: u32,
}

impl DurationThreshold {
    pub fn new(years: u32, months: u32, weeks: u32, days: u32, hours: u32) -> Result<Self, SweepError> {
        let components = [
            (DurationComponent::Years, years),
            (DurationComponent::Months, months),
            (DurationComponent::Weeks, weeks),
            (DurationComponent::Days, days),
            (DurationComponent::Hours, hours),
        ];
        for (kind, value) in components {
            if !is_valid_component(kind, value) {
                return Err(SweepError::Configuration(format!(
                    "duration component {kind:?} out of range: {value}"
                )));
            }
        }
        Ok(Self {
            years,
            months,
            weeks,
            days,
            hours,
        })
    }

    /// True iff `elapsed` strictly exceeds the threshold under the
    /// 365-day-year / 30-day-month approximation.
    pub fn waited_enough(&self, elapsed: Duration) -> bool {
        elapsed > self.wait_duration()
    }

    fn wait_duration(&self) -> Duration {
        let days = self.years as i64 * 365
            + self.months as i64 * 30
            + self.weeks as i64 * 7
            + self.days as i64;
        Duration::days(days) + Duration::hours(self.hours as i64)
    }
}

impl std::fmt::Display for DurationThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [
            (self.years, "y"),
            (self.months, "mo"),
            (self.weeks, "w"),
            (self.days, "d"),
            (self.hours, "h"),
        ];
        let mut wrote = false;
        for (value, unit) in parts {
            if value > 0 {
                if wrote {
                    write!(f, " ")?;
                }
                write!(f, "{value}{unit}")?;
                wrote = true;
            }
        }
        if !wrote {
            write!(f, "none")?;
        }
        Ok(())
    }
}

impl Default for DurationThreshold {
    /// One day between sweeps.
    fn default() -> Self {
        Self {
            years: 0,
            months: 0,
            weeks: 0,
            days: 1,
            hours: 0,
        }
    }
}
