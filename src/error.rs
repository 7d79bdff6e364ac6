//! Sweep engine error types.

use thiserror::Error;

/// Failures produced while evaluating or executing a sweep.
///
/// Every variant is per-entry: one entry failing never aborts the pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// Network or parse failure reaching an external read.
    #[error("data source: {0}")]
    DataSource(String),

    /// Failure reaching or executing the external submission service.
    #[error("submission: {0}")]
    Submission(String),

    /// The non-remainder destinations alone exceed the fee-reduced balance.
    #[error("insufficient funds for specified payouts")]
    InsufficientFunds,

    /// Positive leftover balance with no remainder destination configured.
    /// Sending would abandon the leftover to miner fees.
    #[error("{leftover} subunits left over with no remainder destination")]
    NoChangeDestination {
        /// Leftover subunits that no destination would receive.
        leftover: u64,
    },

    /// Malformed amount-specification string or watch-entry setup.
    #[error("configuration: {0}")]
    Configuration(String),
}
