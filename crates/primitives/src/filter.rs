//! Log filters handed to the source-chain client.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Selects the logs of one event emitted by one contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventFilter {
    /// Contract whose logs are selected.
    pub address: Address,

    /// Signature hash the first topic must equal.
    pub topic0: B256,

    /// Name of the event, carried along so that matched logs can be posted under it.
    pub event_name: String,
}

impl EventFilter {
    /// Returns true if `log` is selected by this filter.
    pub fn matches(&self, log: &crate::receipt::Log) -> bool {
        log.address == self.address && log.signature() == Some(self.topic0)
    }
}
