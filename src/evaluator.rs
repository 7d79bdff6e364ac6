//! Sweep Evaluator
//!
//! Decides whether a watched address should be swept right now. Pure over
//! prefetched facts; re-evaluated fresh on every pass.

use chrono::{DateTime, Duration, Utc};

use crate::types::WatchEntry;

/// Margin added to the elapsed time before comparing against the duration
/// threshold, so a pass running slightly early still fires.
pub const SAFETY_MARGIN_MINUTES: i64 = 5;

pub const SKIP_BALANCE: &str = "balance not large enough";
pub const SKIP_TIME: &str = "not enough time elapsed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDecision {
    Sweep,
    Skip(&'static str),
}

/// The per-entry decision: balance gate first, then the time gate.
///
/// `last_outgoing` is the most recent time the address appeared as the
/// source of a transaction; `None` means the address has never been swept,
/// which proceeds straight to sweeping with no duration check.
pub fn evaluate(
    balance: u64,
    entry: &WatchEntry,
    last_outgoing: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SweepDecision {
    if balance <= entry.balance_threshold {
        return SweepDecision::Skip(SKIP_BALANCE);
    }
    match last_outgoing {
        None => SweepDecision::Sweep,
        Some(most_recent) => {
            let elapsed = now - most_recent + Duration::minutes(SAFETY_MARGIN_MINUTES);
            if entry.time_threshold.waited_enough(elapsed) {
                SweepDecision::Sweep
            } else {
                SweepDecision::Skip(SKIP_TIME)
            }
        }
    }
}
