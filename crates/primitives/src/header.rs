//! Source-chain block headers.
//!
//! A header travels between the relayer and the destination chain as its RLP encoding
//! ([`RawHeader`]). Only the fields the bridge needs are extracted into [`Header`]; the hash is
//! always recomputed from the encoding so that a relayer cannot pair a hash with foreign
//! contents.

use std::fmt;

use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, U256};
use alloy_rlp::Decodable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding a [`RawHeader`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderDecodeError {
    /// The bytes are not a well-formed header RLP list.
    #[error("malformed header rlp: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    /// The encoding is a byte string rather than a list.
    #[error("header rlp is not a list")]
    NotAList,

    /// The list payload length disagrees with the bytes supplied.
    #[error("header rlp length mismatch: declared {declared}, got {actual}")]
    LengthMismatch {
        /// Length declared by the list prefix.
        declared: usize,
        /// Length of the remaining input.
        actual: usize,
    },
}

/// The subset of a source-chain header the bridge tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    /// Hash of the parent header.
    pub parent_hash: B256,

    /// Keccak-256 of this header's RLP encoding.
    pub hash: B256,

    /// Block height.
    pub number: u64,

    /// Root of the block's receipts trie.
    pub receipts_root: B256,
}

impl Header {
    /// Returns true if `self` is the direct child of `parent`.
    pub fn extends(&self, parent: &Header) -> bool {
        self.parent_hash == parent.hash && parent.number.checked_add(1) == Some(self.number)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.number, self.hash)
    }
}

/// A header in its canonical RLP encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawHeader(pub Bytes);

impl RawHeader {
    /// Wraps an RLP-encoded header.
    pub fn new(rlp: impl Into<Bytes>) -> Self {
        Self(rlp.into())
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Keccak-256 of the encoding, i.e. the block hash.
    pub fn hash(&self) -> B256 {
        keccak256(&self.0)
    }

    /// Decodes the tracked fields.
    ///
    /// Field positions follow the canonical header layout: parent hash, ommers hash,
    /// beneficiary, state root, transactions root, receipts root, logs bloom, difficulty,
    /// number. Trailing fields (gas, timestamp, seal, fork additions) are not inspected.
    pub fn decode(&self) -> Result<Header, HeaderDecodeError> {
        let mut buf: &[u8] = &self.0;
        let list = alloy_rlp::Header::decode(&mut buf)?;
        if !list.list {
            return Err(HeaderDecodeError::NotAList);
        }
        if list.payload_length != buf.len() {
            return Err(HeaderDecodeError::LengthMismatch {
                declared: list.payload_length,
                actual: buf.len(),
            });
        }

        let parent_hash = B256::decode(&mut buf)?;
        let _ommers_hash = B256::decode(&mut buf)?;
        let _beneficiary = Address::decode(&mut buf)?;
        let _state_root = B256::decode(&mut buf)?;
        let _transactions_root = B256::decode(&mut buf)?;
        let receipts_root = B256::decode(&mut buf)?;
        let _logs_bloom = Bloom::decode(&mut buf)?;
        let _difficulty = U256::decode(&mut buf)?;
        let number = u64::decode(&mut buf)?;

        Ok(Header {
            parent_hash,
            hash: self.hash(),
            number,
            receipts_root,
        })
    }
}

impl From<Vec<u8>> for RawHeader {
    fn from(value: Vec<u8>) -> Self {
        Self(value.into())
    }
}
