use chrono::{Duration, Utc};
use coinsweeper::evaluator::{evaluate, SweepDecision, SKIP_BALANCE, SKIP_TIME};
use coinsweeper::threshold::DurationThreshold;
use coinsweeper::types::WatchEntry;

fn entry_with(balance_threshold: u64, time_threshold: DurationThreshold) -> WatchEntry {
    WatchEntry::new(
        "1WatchedAddress".to_string(),
        "private-key".to_string(),
        balance_threshold,
        time_threshold,
    )
}

fn one_hour() -> DurationThreshold {
    DurationThreshold::new(0, 0, 0, 0, 1).unwrap()
}

#[test]
fn test_balance_at_threshold_skips() {
    let entry = entry_with(1_000_000, one_hour());
    let decision = evaluate(1_000_000, &entry, None, Utc::now());
    assert_eq!(decision, SweepDecision::Skip(SKIP_BALANCE));
}

#[test]
fn test_balance_below_threshold_skips() {
    let entry = entry_with(1_000_000, one_hour());
    let decision = evaluate(999, &entry, None, Utc::now());
    assert_eq!(decision, SweepDecision::Skip(SKIP_BALANCE));
}

#[test]
fn test_never_swept_proceeds_without_duration_check() {
    // A ten-year threshold is irrelevant when there is no outgoing
    // transfer on record.
    let entry = entry_with(1_000_000, DurationThreshold::new(10, 0, 0, 0, 0).unwrap());
    let decision = evaluate(2_000_000, &entry, None, Utc::now());
    assert_eq!(decision, SweepDecision::Sweep);
}

#[test]
fn test_recent_send_within_threshold_skips() {
    // Swept 4 minutes ago against a 1-hour threshold: 4m + 5m margin = 9m,
    // still well short.
    let entry = entry_with(1_000_000, one_hour());
    let now = Utc::now();
    let decision = evaluate(2_000_000, &entry, Some(now - Duration::minutes(4)), now);
    assert_eq!(decision, SweepDecision::Skip(SKIP_TIME));
}

#[test]
fn test_old_send_proceeds() {
    let entry = entry_with(1_000_000, one_hour());
    let now = Utc::now();
    let decision = evaluate(2_000_000, &entry, Some(now - Duration::hours(2)), now);
    assert_eq!(decision, SweepDecision::Sweep);
}

#[test]
fn test_safety_margin_can_tip_the_decision() {
    // 56 minutes elapsed + 5 minute margin = 61 minutes, just over an hour.
    let entry = entry_with(1_000_000, one_hour());
    let now = Utc::now();
    let decision = evaluate(2_000_000, &entry, Some(now - Duration::minutes(56)), now);
    assert_eq!(decision, SweepDecision::Sweep);

    // 54 minutes + margin = 59 minutes, still short.
    let decision = evaluate(2_000_000, &entry, Some(now - Duration::minutes(54)), now);
    assert_eq!(decision, SweepDecision::Skip(SKIP_TIME));
}

#[test]
fn test_balance_gate_wins_over_time_gate() {
    let entry = entry_with(1_000_000, one_hour());
    let now = Utc::now();
    // Both gates would skip; the balance reason is reported.
    let decision = evaluate(500, &entry, Some(now - Duration::minutes(1)), now);
    assert_eq!(decision, SweepDecision::Skip(SKIP_BALANCE));
}
