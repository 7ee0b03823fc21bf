use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Denomination of a bridged token: the bridge contract it came through and the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Denom {
    /// Bridge contract on the source chain.
    pub contract: Address,

    /// Token contract on the source chain.
    pub token: Address,
}

/// A decoded `Deposit` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDeposit {
    /// Depositor on the source chain.
    pub from: Address,

    /// Account credited on the destination chain.
    pub to: Address,

    /// Deposited amount.
    pub value: U256,

    /// Token contract.
    pub token: Address,

    /// Per-contract packet sequence.
    pub sequence: u64,
}

/// A decoded `DataSubmitted` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    /// Submitter on the source chain.
    pub submitter: Address,

    /// Submitted bytes.
    pub data: Bytes,

    /// Per-contract packet sequence.
    pub sequence: u64,
}

/// A decoded event, one variant per known event shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Token deposit.
    Deposit(TokenDeposit),

    /// Data submission.
    Data(DataPacket),
}

impl Payload {
    /// Sequence number; with the emitting contract it identifies the packet.
    pub fn sequence(&self) -> u64 {
        match self {
            Self::Deposit(deposit) => deposit.sequence,
            Self::Data(data) => data.sequence,
        }
    }

    /// Event shape this payload was decoded from.
    pub fn event_kind(&self) -> crate::code::EventKind {
        match self {
            Self::Deposit(_) => crate::code::EventKind::Deposit,
            Self::Data(_) => crate::code::EventKind::DataSubmitted,
        }
    }
}
