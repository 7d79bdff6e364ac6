//! Core data types for the coin sweeper.

use serde::{Deserialize, Serialize};

use crate::amount;
use crate::error::SweepError;
use crate::threshold::DurationThreshold;

pub type Address = String;

/// Subunits per major unit of the ledger (satoshis per coin).
pub const SUBUNIT_SCALE: f64 = 1e8;

/// Convert a major-unit amount to subunits, rounding to the nearest subunit.
pub fn to_subunits(units: f64) -> u64 {
    (units * SUBUNIT_SCALE).round() as u64
}

pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// One destination for swept funds: where to send and how much, as the
/// raw amount-specification string the user entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub address: Address,
    pub amount: String,
}

/// A watched address plus its sweep criteria and destinations.
///
/// Destinations keep insertion order; remainder receivers are paid in that
/// order, so reordering would change which receivers a split lands on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEntry {
    pub address: Address,
    /// Opaque credential handed to the submission service. Never inspected
    /// or logged here.
    pub private_key: String,
    /// Minimum balance, in subunits, before a sweep is considered.
    pub balance_threshold: u64,
    pub time_threshold: DurationThreshold,
    destinations: Vec<Destination>,
}

impl WatchEntry {
    pub fn new(
        address: Address,
        private_key: String,
        balance_threshold: u64,
        time_threshold: DurationThreshold,
    ) -> Self {
        Self {
            address,
            private_key,
            balance_threshold,
            time_threshold,
            destinations: Vec::new(),
        }
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Add a destination, rejecting duplicates and unparseable amount specs.
    pub fn add_destination(&mut self, address: Address, amount: String) -> Result<(), SweepError> {
        if self.destinations.iter().any(|d| d.address == address) {
            return Err(SweepError::Configuration(format!(
                "duplicate destination {address}"
            )));
        }
        amount::classify(&amount)?;
        self.destinations.push(Destination { address, amount });
        Ok(())
    }

    /// Remove a destination by address. Returns whether anything was removed.
    pub fn remove_destination(&mut self, address: &str) -> bool {
        let before = self.destinations.len();
        self.destinations.retain(|d| d.address != address);
        self.destinations.len() != before
    }
}

/// The set of watched addresses for one transaction service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchList {
    entries: Vec<WatchEntry>,
}

impl WatchList {
    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, replacing any existing entry for the same address.
    pub fn upsert(&mut self, entry: WatchEntry) {
        self.entries.retain(|e| e.address != entry.address);
        self.entries.push(entry);
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut WatchEntry> {
        self.entries.iter_mut().find(|e| e.address == address)
    }
}

/// Outcome of one orchestration pass for one watch entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepResult {
    /// Criteria not met; nothing attempted.
    Skipped(String),
    /// Something went wrong fetching data, resolving amounts, or submitting.
    Failed(SweepError),
    /// Sweep submitted; carries the transaction reference.
    Submitted(String),
}

impl std::fmt::Display for SweepResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepResult::Skipped(reason) => write!(f, "skipped: {reason}"),
            SweepResult::Failed(err) => write!(f, "failed: {err}"),
            SweepResult::Submitted(tx) => write!(f, "submitted tx {tx}"),
        }
    }
}
