//! Sweep Monitor
//!
//! Orchestrates one pass over the watch list: fetches ledger data,
//! evaluates sweep criteria, resolves destination amounts and submits.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::amount;
use crate::data_source::DataSource;
use crate::error::SweepError;
use crate::evaluator::{self, SweepDecision};
use crate::fee::estimate_fee;
use crate::tx_submitter::SubmissionService;
use crate::types::{truncate_address, Address, SweepResult, WatchEntry};

/// Sweep orchestrator for one transaction service.
///
/// Collaborators are injected explicitly; nothing is shared across entries
/// except these handles, so per-entry work never leaks state into another
/// entry's result.
pub struct SweepMonitor {
    data_source: Arc<dyn DataSource>,
    submitter: Arc<dyn SubmissionService>,
    fiat_currency: String,
}

impl SweepMonitor {
    pub fn new(
        data_source: Arc<dyn DataSource>,
        submitter: Arc<dyn SubmissionService>,
        fiat_currency: impl Into<String>,
    ) -> Self {
        Self {
            data_source,
            submitter,
            fiat_currency: fiat_currency.into(),
        }
    }

    /// Evaluate and, if warranted, sweep a single entry.
    pub async fn process_entry(&self, entry: &WatchEntry) -> SweepResult {
        info!("checking {}", truncate_address(&entry.address));

        let balance = match self.data_source.balance(&entry.address).await {
            Ok(balance) => balance,
            Err(e) => return SweepResult::Failed(e),
        };
        // Balance gate first: the (heavier) history lookup only runs for
        // addresses that have accumulated enough.
        if balance <= entry.balance_threshold {
            return SweepResult::Skipped(evaluator::SKIP_BALANCE.to_string());
        }

        let last_outgoing = match self
            .data_source
            .last_outgoing_transfer_time(&entry.address)
            .await
        {
            Ok(last_outgoing) => last_outgoing,
            Err(e) => return SweepResult::Failed(e),
        };

        match evaluator::evaluate(balance, entry, last_outgoing, Utc::now()) {
            SweepDecision::Skip(reason) => SweepResult::Skipped(reason.to_string()),
            SweepDecision::Sweep => match self.sweep(entry, balance).await {
                Ok(tx) => SweepResult::Submitted(tx),
                Err(e) => SweepResult::Failed(e),
            },
        }
    }

    async fn sweep(&self, entry: &WatchEntry, balance: u64) -> Result<String, SweepError> {
        let input_count = self.data_source.unspent_output_count(&entry.address).await?;
        if input_count == 0 {
            return Err(SweepError::DataSource(
                "no unspent outputs to sweep".to_string(),
            ));
        }

        let fee = estimate_fee(input_count, entry.destinations().len());
        let available = balance as i64 - fee as i64;
        info!(
            "sweeping {}: balance={balance} fee={fee} inputs={input_count}",
            truncate_address(&entry.address)
        );

        let amounts = amount::resolve(
            available,
            entry.destinations(),
            self.data_source.as_ref(),
            &self.fiat_currency,
        )
        .await?;

        self.submitter
            .submit(&entry.address, &entry.private_key, &amounts, fee)
            .await
    }

    /// Process every entry independently. One entry failing never aborts
    /// the others; the report always carries one result per entry.
    pub async fn process_all(&self, entries: &[WatchEntry]) -> BTreeMap<Address, SweepResult> {
        let mut report = BTreeMap::new();

        for entry in entries {
            let result = self.process_entry(entry).await;
            match &result {
                SweepResult::Failed(e) => {
                    warn!("{}: {e}", truncate_address(&entry.address));
                }
                other => {
                    info!("{}: {other}", truncate_address(&entry.address));
                }
            }
            report.insert(entry.address.clone(), result);
        }

        report
    }
}
