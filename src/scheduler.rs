//! Scheduler
//!
//! Runs sweep passes once or continuously on an interval.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::info;

use crate::monitor::SweepMonitor;
use crate::types::{Address, SweepResult, WatchEntry};

pub struct Scheduler {
    monitor: Arc<SweepMonitor>,
    interval_seconds: u64,
}

impl Scheduler {
    pub fn new(monitor: Arc<SweepMonitor>, interval_seconds: u64) -> Self {
        Self {
            monitor,
            interval_seconds,
        }
    }

    pub async fn run_once(&self, entries: &[WatchEntry]) -> BTreeMap<Address, SweepResult> {
        info!("starting sweep pass over {} entries", entries.len());
        let report = self.monitor.process_all(entries).await;

        let submitted = report
            .values()
            .filter(|r| matches!(r, SweepResult::Submitted(_)))
            .count();
        info!(
            "sweep pass complete: {submitted} of {} entries submitted",
            report.len()
        );
        report
    }

    pub async fn run_continuous(&self, entries: &[WatchEntry]) {
        let interval = Duration::from_secs(self.interval_seconds);
        info!(
            "starting continuous sweep mode (interval: {}s)",
            self.interval_seconds
        );

        loop {
            self.run_once(entries).await;
            info!("waiting {}s until next pass", self.interval_seconds);
            sleep(interval).await;
        }
    }
}
