//! Source-chain access.

use async_trait::async_trait;
use bridge_primitives::{
    filter::EventFilter,
    header::RawHeader,
    receipt::{Log, Receipt},
};

use crate::{errors::SourceError, subscription::Subscription};

/// A log together with its position in the block that emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLog {
    /// The log itself.
    pub log: Log,

    /// Height of the emitting block.
    pub block_number: u64,

    /// Position of the emitting transaction in the block.
    pub tx_index: u64,

    /// Position of the log among all logs of the block.
    pub log_index: u64,
}

/// Read access to the source chain.
#[async_trait]
pub trait SourceChain: Send + Sync {
    /// Streams every new head the node learns about, in the order it learns them.
    async fn subscribe_new_heads(&self) -> Result<Subscription<RawHeader>, SourceError>;

    /// Fetches the canonical header at `number`.
    async fn header_by_number(&self, number: u64) -> Result<RawHeader, SourceError>;

    /// Fetches the logs of block `block_number` selected by `filter`.
    async fn logs(
        &self,
        filter: &EventFilter,
        block_number: u64,
    ) -> Result<Vec<LocatedLog>, SourceError>;

    /// Fetches every receipt of block `block_number` in transaction order.
    async fn block_receipts(&self, block_number: u64) -> Result<Vec<Receipt>, SourceError>;
}
