//! Transaction submission service.
//!
//! The engine never builds or signs transactions itself; it hands the
//! resolved destination amounts, fee and credential to a submission
//! service and records the returned transaction reference.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::error::SweepError;
use crate::types::{truncate_address, Address};

#[async_trait]
pub trait SubmissionService: Send + Sync {
    /// Submit a sweep of `address`, sending each destination its resolved
    /// subunit amount and paying `fee`. Returns the transaction reference.
    async fn submit(
        &self,
        address: &str,
        private_key: &str,
        amounts: &[(Address, u64)],
        fee: u64,
    ) -> Result<String, SweepError>;
}

/// [`SubmissionService`] backed by the blockchain.info merchant sendmany
/// endpoint, which constructs, signs and broadcasts the transaction.
pub struct BlockchainSubmitter {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SendManyResponse {
    tx_hash: Option<String>,
    error: Option<String>,
}

impl BlockchainSubmitter {
    pub fn new() -> Self {
        Self::with_base_url(crate::data_source::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for BlockchainSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionService for BlockchainSubmitter {
    async fn submit(
        &self,
        address: &str,
        private_key: &str,
        amounts: &[(Address, u64)],
        fee: u64,
    ) -> Result<String, SweepError> {
        let recipients: serde_json::Map<String, serde_json::Value> = amounts
            .iter()
            .map(|(dest, amount)| (dest.clone(), serde_json::Value::from(*amount)))
            .collect();
        let recipients = serde_json::Value::Object(recipients).to_string();

        let url = format!("{}/merchant/{private_key}/sendmany", self.base_url);
        let fee = fee.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("recipients", recipients.as_str()),
                ("shared", "false"),
                ("fee", fee.as_str()),
                ("from", address),
            ])
            .send()
            .await
            .map_err(|e| SweepError::Submission(e.to_string()))?
            .error_for_status()
            .map_err(|e| SweepError::Submission(e.to_string()))?;

        let body: SendManyResponse = response
            .json()
            .await
            .map_err(|e| SweepError::Submission(e.to_string()))?;

        match body.tx_hash {
            Some(tx_hash) => {
                info!(
                    "sweep submitted from {}: {} destinations, fee {fee}",
                    truncate_address(address),
                    amounts.len()
                );
                Ok(tx_hash)
            }
            None => Err(SweepError::Submission(
                body.error
                    .unwrap_or_else(|| "no tx_hash in response".to_string()),
            )),
        }
    }
}
