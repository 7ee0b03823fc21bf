//! Builders for receipts and logs.

use alloy_primitives::{Address, Bloom, Bytes, B256};
use bridge_primitives::receipt::{Log, Receipt};

/// A successful legacy receipt carrying `logs`.
pub fn receipt(cumulative_gas_used: u64, logs: Vec<Log>) -> Receipt {
    Receipt {
        tx_type: 0,
        success: true,
        cumulative_gas_used,
        logs_bloom: Bloom::ZERO,
        logs,
    }
}

/// A block's worth of log-less receipts with distinct gas counters.
pub fn filler_receipts(count: usize) -> Vec<Receipt> {
    (0..count as u64)
        .map(|i| receipt(21_000 * (i + 1), Vec::new()))
        .collect()
}

/// A log with the given topics and data.
pub fn log(address: Address, topics: Vec<B256>, data: impl Into<Bytes>) -> Log {
    Log {
        address,
        topics,
        data: data.into(),
    }
}
