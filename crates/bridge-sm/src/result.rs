//! Outcome of a delivered transaction, as reported back to the submitter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable numeric status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ResultCode {
    /// Applied.
    Ok = 0,
    /// The transaction or something it carries does not decode.
    Malformed = 1,
    /// The header chain has no genesis yet.
    NotInitialized = 2,
    /// The headers are not linked, or do not connect to the finalized frontier.
    NonContiguousHeaderList = 3,
    /// The headers conflict with the finalized chain.
    ConflictingChain = 4,
    /// The code identifier is unknown.
    InvalidCode = 5,
    /// The contract is registered under another code.
    ContractCodeMismatch = 6,
    /// The log's emitter is not a registered contract.
    ContractNotRegistered = 7,
    /// The code has no event of that name.
    InvalidEventName = 8,
    /// The log does not match the event's ABI.
    DecodeError = 9,
    /// The packet was applied before.
    PacketAlreadyExists = 10,
    /// The proof refers to a block that is not finalized.
    BlockNotFinalized = 11,
    /// The proof does not verify against the block's receipts root.
    InvalidProof = 12,
    /// A balance would overflow.
    Overflow = 13,
    /// The store failed.
    Internal = 14,
}

impl ResultCode {
    /// Every code, in numeric order.
    pub const ALL: [ResultCode; 15] = [
        Self::Ok,
        Self::Malformed,
        Self::NotInitialized,
        Self::NonContiguousHeaderList,
        Self::ConflictingChain,
        Self::InvalidCode,
        Self::ContractCodeMismatch,
        Self::ContractNotRegistered,
        Self::InvalidEventName,
        Self::DecodeError,
        Self::PacketAlreadyExists,
        Self::BlockNotFinalized,
        Self::InvalidProof,
        Self::Overflow,
        Self::Internal,
    ];

    /// Numeric value on the wire.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Parses a numeric value.
    pub fn from_u32(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Whether the code reports a rejection caused by chain state rather than by a malformed
    /// transaction or a failing node. Such rejections are final: resubmitting the same
    /// transaction is rejected again.
    pub fn is_consistency_failure(self) -> bool {
        matches!(
            self,
            Self::NonContiguousHeaderList
                | Self::ConflictingChain
                | Self::ContractCodeMismatch
                | Self::ContractNotRegistered
                | Self::PacketAlreadyExists
        )
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", self.as_u32())
    }
}

/// Status and log line of a delivered transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    /// Status.
    pub code: ResultCode,

    /// Human-readable detail.
    pub log: String,
}

impl TxResult {
    /// A successful result.
    pub fn ok(log: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Ok,
            log: log.into(),
        }
    }

    /// Whether the transaction was applied.
    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok
    }
}

impl fmt::Display for TxResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ResultCode::Ok.as_u32(), 0);
        assert_eq!(ResultCode::NonContiguousHeaderList.as_u32(), 3);
        assert_eq!(ResultCode::PacketAlreadyExists.as_u32(), 10);
        assert_eq!(ResultCode::Internal.as_u32(), 14);

        for (i, code) in ResultCode::ALL.iter().enumerate() {
            assert_eq!(code.as_u32() as usize, i);
            assert_eq!(ResultCode::from_u32(i as u32), Some(*code));
        }
        assert_eq!(ResultCode::from_u32(15), None);
    }
}
