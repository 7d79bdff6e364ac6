//! Ledger data source: balances, unspent outputs, transfer history and
//! exchange rates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::SweepError;

/// Read-only view of the ledger consumed by the sweep engine.
///
/// Implementations own their connection handling and retry policy; the
/// engine treats every error as a per-entry [`SweepError::DataSource`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Confirmed balance of `address`, in subunits.
    async fn balance(&self, address: &str) -> Result<u64, SweepError>;

    /// Number of unspent outputs currently held by `address`.
    async fn unspent_output_count(&self, address: &str) -> Result<usize, SweepError>;

    /// Most recent time `address` appeared as the source of a transaction.
    /// `None` means no outgoing transfer on record (never swept).
    async fn last_outgoing_transfer_time(
        &self,
        address: &str,
    ) -> Result<Option<DateTime<Utc>>, SweepError>;

    /// Current exchange rate, in `currency` per major ledger unit.
    async fn exchange_rate(&self, currency: &str) -> Result<f64, SweepError>;
}

pub const DEFAULT_BASE_URL: &str = "https://blockchain.info";

/// Minimum confirmations before a balance counts toward the threshold.
const CONFIRMATIONS: u32 = 6;

/// [`DataSource`] backed by the blockchain.info query API.
pub struct BlockchainDataSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct UnspentResponse {
    unspent_outputs: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawAddress {
    txs: Vec<RawTx>,
}

#[derive(Deserialize)]
struct RawTx {
    time: i64,
    #[serde(default)]
    inputs: Vec<RawInput>,
}

#[derive(Deserialize)]
struct RawInput {
    prev_out: Option<PrevOut>,
}

#[derive(Deserialize)]
struct PrevOut {
    addr: Option<String>,
}

impl BlockchainDataSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_text(&self, url: String) -> Result<String, SweepError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SweepError::DataSource(e.to_string()))?
            .error_for_status()
            .map_err(|e| SweepError::DataSource(e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| SweepError::DataSource(e.to_string()))
    }
}

impl Default for BlockchainDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for BlockchainDataSource {
    async fn balance(&self, address: &str) -> Result<u64, SweepError> {
        let url = format!(
            "{}/q/addressbalance/{address}?confirmations={CONFIRMATIONS}",
            self.base_url
        );
        let body = self.get_text(url).await?;
        body.trim()
            .parse()
            .map_err(|_| SweepError::DataSource(format!("unexpected balance response: {body}")))
    }

    async fn unspent_output_count(&self, address: &str) -> Result<usize, SweepError> {
        let url = format!("{}/unspent?active={address}", self.base_url);
        let body = self.get_text(url).await?;
        if body.contains("No free outputs") {
            return Ok(0);
        }
        let unspent: UnspentResponse = serde_json::from_str(&body)
            .map_err(|e| SweepError::DataSource(format!("unspent outputs: {e}")))?;
        Ok(unspent.unspent_outputs.len())
    }

    async fn last_outgoing_transfer_time(
        &self,
        address: &str,
    ) -> Result<Option<DateTime<Utc>>, SweepError> {
        let url = format!("{}/rawaddr/{address}", self.base_url);
        let body = self.get_text(url).await?;
        let raw: RawAddress = serde_json::from_str(&body)
            .map_err(|e| SweepError::DataSource(format!("address transactions: {e}")))?;

        // An outgoing transfer is any transaction with an input funded by
        // this address; take the newest one.
        let newest = raw
            .txs
            .iter()
            .filter(|tx| {
                tx.inputs.iter().any(|input| {
                    input
                        .prev_out
                        .as_ref()
                        .and_then(|p| p.addr.as_deref())
                        .is_some_and(|addr| addr == address)
                })
            })
            .map(|tx| tx.time)
            .max();

        match newest {
            None => Ok(None),
            Some(time) => DateTime::from_timestamp(time, 0)
                .map(Some)
                .ok_or_else(|| SweepError::DataSource(format!("bad transaction time: {time}"))),
        }
    }

    async fn exchange_rate(&self, currency: &str) -> Result<f64, SweepError> {
        let url = format!("{}/ticker", self.base_url);
        let body = self.get_text(url).await?;
        let ticker: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| SweepError::DataSource(format!("ticker: {e}")))?;
        ticker[currency]["15m"]
            .as_f64()
            .ok_or_else(|| SweepError::DataSource(format!("no {currency} rate in ticker")))
    }
}
