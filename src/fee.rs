//! Network fee estimation from input and output counts.

/// Fee unit per started kilobyte of transaction, in subunits.
pub const MINIMUM_FEE: u64 = 10_000;

const INPUT_SIZE: u64 = 180; // newer inputs can be as small as 148
const OUTPUT_SIZE: u64 = 34;
const HEADER_SIZE: u64 = 10;

/// Estimate the network fee for a transaction that spends `input_count`
/// unspent outputs to `output_count` destinations.
///
/// The size term carries a trailing `+ input_count` as margin of error, and
/// the fee rounds via `ceil(size / 1000 + 0.5)`, which charges one extra
/// fee unit when the size lands exactly on a multiple of 1000. Both quirks
/// are part of the expected fee schedule; callers account for them rather
/// than this function smoothing them out.
pub fn estimate_fee(input_count: usize, output_count: usize) -> u64 {
    let size = INPUT_SIZE * input_count as u64
        + OUTPUT_SIZE * output_count as u64
        + HEADER_SIZE
        + input_count as u64;
    MINIMUM_FEE * (size as f64 / 1000.0 + 0.5).ceil() as u64
}
