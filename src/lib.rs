//! Coin Sweeper
//!
//! Watches funded addresses and, once each has accumulated enough balance
//! and enough time has passed since its last outgoing transfer, sweeps the
//! balance (minus network fee) to its configured destinations.

pub mod amount;
pub mod data_source;
pub mod error;
pub mod evaluator;
pub mod fee;
pub mod monitor;
pub mod scheduler;
pub mod store;
pub mod threshold;
pub mod tx_submitter;
pub mod types;
