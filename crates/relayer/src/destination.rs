//! Destination-chain access.

use async_trait::async_trait;
use bridge_header_chain::keys::{buffer_key, final_key, GENESIS_KEY, LAST_FINALIZED_KEY};
use bridge_primitives::{header::Header, B256};
use bridge_sm::TxResult;
use serde::de::DeserializeOwned;

use crate::errors::DestinationError;

/// Access to the destination chain's bridge module.
#[async_trait]
pub trait DestinationChain: Send + Sync {
    /// Reads the raw value stored under `key`.
    async fn query(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DestinationError>;

    /// Broadcasts an encoded transaction and waits until it is included.
    async fn broadcast_tx_commit(&self, tx: &[u8]) -> Result<TxResult, DestinationError>;

    /// Height of the latest destination block.
    async fn latest_height(&self) -> Result<u64, DestinationError>;
}

/// Typed reads of the header chain kept by the bridge module.
#[async_trait]
pub trait DestinationExt: DestinationChain {
    /// Reads and decodes the value under `key`.
    async fn query_value<T: DeserializeOwned + Send>(
        &self,
        key: &[u8],
    ) -> Result<Option<T>, DestinationError> {
        match self.query(key).await? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The genesis header, if the chain is initialized.
    async fn genesis(&self) -> Result<Option<Header>, DestinationError> {
        self.query_value(GENESIS_KEY).await
    }

    /// The last finalized height, if the chain is initialized.
    async fn last_finalized(&self) -> Result<Option<u64>, DestinationError> {
        self.query_value(LAST_FINALIZED_KEY).await
    }

    /// The finalized header at `number`.
    async fn finalized_header(&self, number: u64) -> Result<Option<Header>, DestinationError> {
        self.query_value(&final_key(number)).await
    }

    /// Whether the header with `hash` has already been submitted.
    async fn is_buffered(&self, hash: &B256) -> Result<bool, DestinationError> {
        Ok(self.query(&buffer_key(hash)).await?.is_some())
    }
}

impl<T: DestinationChain + ?Sized> DestinationExt for T {}
