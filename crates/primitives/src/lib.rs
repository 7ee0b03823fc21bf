//! Source-chain data types shared by every bridge component: headers in their wire form,
//! receipts and event logs, and the log filters handed to the source-chain client.

pub mod filter;
pub mod header;
pub mod receipt;

pub use alloy_primitives::{Address, Bloom, Bytes, B256, U256};
