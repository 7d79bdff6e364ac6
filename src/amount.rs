//! Amount Resolver
//!
//! Classifies destination amount-specification strings and turns them into
//! concrete subunit amounts against a fee-reduced balance.

use tracing::debug;

use crate::data_source::DataSource;
use crate::error::SweepError;
use crate::types::{Address, Destination, SUBUNIT_SCALE};

/// A parsed amount specification.
///
/// Specs are classified by shape, in a fixed order, because the grammar is
/// ambiguous: `"0"` (and any integer ≤ 0) means "take a share of the
/// remainder", not "send zero subunits".
#[derive(Debug, Clone, PartialEq)]
pub enum AmountSpec {
    /// `"12.5%"` — percent of the fee-reduced balance.
    Percentage(f64),
    /// `"$20"` — fiat amount, converted at the current exchange rate.
    FixedFiat(f64),
    /// `"0.3"` — major units of the ledger.
    FixedUnits(f64),
    /// `"250000"` — subunits, verbatim.
    FixedSubunits(u64),
    /// `"0"` — receives a share of whatever is left after the others.
    Remainder,
}

/// Classify an amount-specification string.
///
/// Order matters and must not be rearranged:
/// 1. trailing `%` → percentage
/// 2. leading `$` → fiat
/// 3. contains `.` → major units
/// 4. integer ≤ 0 → remainder
/// 5. otherwise → subunits
pub fn classify(spec: &str) -> Result<AmountSpec, SweepError> {
    let spec = spec.trim();
    if let Some(percent) = spec.strip_suffix('%') {
        let p = parse_non_negative(percent, spec)?;
        return Ok(AmountSpec::Percentage(p));
    }
    if let Some(fiat) = spec.strip_prefix('$') {
        let f = parse_non_negative(fiat, spec)?;
        return Ok(AmountSpec::FixedFiat(f));
    }
    if spec.contains('.') {
        let f = parse_non_negative(spec, spec)?;
        return Ok(AmountSpec::FixedUnits(f));
    }
    let n: i64 = spec
        .parse()
        .map_err(|_| SweepError::Configuration(format!("unparseable amount spec: {spec:?}")))?;
    if n <= 0 {
        Ok(AmountSpec::Remainder)
    } else {
        Ok(AmountSpec::FixedSubunits(n as u64))
    }
}

fn parse_non_negative(value: &str, spec: &str) -> Result<f64, SweepError> {
    let f: f64 = value
        .trim()
        .parse()
        .map_err(|_| SweepError::Configuration(format!("unparseable amount spec: {spec:?}")))?;
    if f.is_sign_negative() || !f.is_finite() {
        return Err(SweepError::Configuration(format!(
            "negative amount spec: {spec:?}"
        )));
    }
    Ok(f)
}

/// Resolve every destination of an entry into concrete subunit amounts.
///
/// `fee_reduced_balance` is the address balance minus the estimated fee; it
/// is the base for percentage amounts and the pool remainder receivers
/// split. The exchange rate is fetched lazily on the first fiat spec and
/// reused for the rest of this resolution only — never across entries,
/// since rates are time-sensitive.
///
/// Returns the destinations paired with their final amounts, in stored
/// order. Fails with [`SweepError::InsufficientFunds`] when the fixed
/// destinations overdraw the balance, and with
/// [`SweepError::NoChangeDestination`] when value would be left over with
/// nowhere to go.
pub async fn resolve(
    fee_reduced_balance: i64,
    destinations: &[Destination],
    data_source: &dyn DataSource,
    fiat_currency: &str,
) -> Result<Vec<(Address, u64)>, SweepError> {
    if fee_reduced_balance < 0 {
        return Err(SweepError::InsufficientFunds);
    }
    let balance = fee_reduced_balance as u64;
    let mut current_balance = fee_reduced_balance;
    let mut amounts: Vec<(Address, u64)> = Vec::with_capacity(destinations.len());
    let mut remainder_receivers: Vec<usize> = Vec::new();
    let mut rate: Option<f64> = None;

    for (index, dest) in destinations.iter().enumerate() {
        match classify(&dest.amount)? {
            AmountSpec::Percentage(p) => {
                let amount = (balance as f64 * p / 100.0).floor() as u64;
                debug!("sending {p}% ({amount}) to {}", dest.address);
                current_balance = current_balance.saturating_sub_unsigned(amount);
                amounts.push((dest.address.clone(), amount));
            }
            AmountSpec::FixedFiat(f) => {
                let r = match rate {
                    Some(r) => r,
                    None => {
                        let fetched = data_source.exchange_rate(fiat_currency).await?;
                        if !fetched.is_finite() || fetched <= 0.0 {
                            return Err(SweepError::DataSource(format!(
                                "unusable {fiat_currency} exchange rate: {fetched}"
                            )));
                        }
                        debug!("{fiat_currency} exchange rate: {fetched}");
                        rate = Some(fetched);
                        fetched
                    }
                };
                let amount = (f / r * SUBUNIT_SCALE).round() as u64;
                debug!("sending ${f} ({amount}) to {}", dest.address);
                current_balance = current_balance.saturating_sub_unsigned(amount);
                amounts.push((dest.address.clone(), amount));
            }
            AmountSpec::FixedUnits(f) => {
                let amount = (f * SUBUNIT_SCALE).round() as u64;
                debug!("sending {amount} to {}", dest.address);
                current_balance = current_balance.saturating_sub_unsigned(amount);
                amounts.push((dest.address.clone(), amount));
            }
            AmountSpec::FixedSubunits(n) => {
                debug!("sending {n} to {}", dest.address);
                current_balance = current_balance.saturating_sub_unsigned(n);
                amounts.push((dest.address.clone(), n));
            }
            AmountSpec::Remainder => {
                debug!("sending a remainder share to {}", dest.address);
                remainder_receivers.push(index);
                amounts.push((dest.address.clone(), 0));
            }
        }
    }

    if current_balance < 0 {
        return Err(SweepError::InsufficientFunds);
    }
    if remainder_receivers.is_empty() {
        if current_balance > 0 {
            // Leftover would be abandoned to miner fees, which is almost
            // certainly a misconfigured destination set.
            return Err(SweepError::NoChangeDestination {
                leftover: current_balance as u64,
            });
        }
    } else if current_balance > 0 {
        // Integer division; the residue stays behind as extra miner fee
        // rather than being handed to any one receiver.
        let share = current_balance as u64 / remainder_receivers.len() as u64;
        for index in remainder_receivers {
            amounts[index].1 = share;
        }
    }

    Ok(amounts)
}
