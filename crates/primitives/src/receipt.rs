//! Transaction receipts and the event logs they carry.

use alloy_primitives::{Address, Bloom, Bytes, B256};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

/// Highest byte value that can prefix a typed (EIP-2718) receipt.
const MAX_TX_TYPE: u8 = 0x7f;

/// An event log emitted by a contract.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, RlpEncodable, RlpDecodable,
)]
pub struct Log {
    /// Emitting contract.
    pub address: Address,

    /// Indexed topics; the first one is the event signature hash.
    pub topics: Vec<B256>,

    /// ABI-encoded non-indexed arguments.
    pub data: Bytes,
}

impl Log {
    /// Returns the event signature topic, if any.
    pub fn signature(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// A post-Byzantium transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// EIP-2718 transaction type, `0` for legacy transactions.
    pub tx_type: u8,

    /// Whether the transaction succeeded.
    pub success: bool,

    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,

    /// Bloom filter over the receipt's logs.
    pub logs_bloom: Bloom,

    /// Logs in emission order.
    pub logs: Vec<Log>,
}

impl Receipt {
    fn rlp_payload_length(&self) -> usize {
        self.success.length()
            + self.cumulative_gas_used.length()
            + self.logs_bloom.length()
            + self.logs.length()
    }

    /// Encodes the receipt the way it is stored in the receipts trie: a bare RLP list for legacy
    /// receipts, the type byte followed by the list otherwise.
    pub fn encoded_2718(&self) -> Vec<u8> {
        let payload_length = self.rlp_payload_length();
        let mut out = Vec::with_capacity(payload_length + 4);
        if self.tx_type != 0 {
            out.push(self.tx_type);
        }
        alloy_rlp::Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.success.encode(&mut out);
        self.cumulative_gas_used.encode(&mut out);
        self.logs_bloom.encode(&mut out);
        self.logs.encode(&mut out);
        out
    }

    /// Decodes a receipt from its trie encoding.
    pub fn decode_2718(bytes: &[u8]) -> alloy_rlp::Result<Self> {
        let (tx_type, mut buf) = match bytes.first() {
            Some(&ty) if ty <= MAX_TX_TYPE => (ty, &bytes[1..]),
            Some(_) => (0, bytes),
            None => return Err(alloy_rlp::Error::InputTooShort),
        };

        let header = alloy_rlp::Header::decode(&mut buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        if header.payload_length != buf.len() {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: header.payload_length,
                got: buf.len(),
            });
        }

        let success = bool::decode(&mut buf)?;
        let cumulative_gas_used = u64::decode(&mut buf)?;
        let logs_bloom = Bloom::decode(&mut buf)?;
        let logs = Vec::<Log>::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(alloy_rlp::Error::Custom("trailing bytes in receipt"));
        }

        Ok(Self {
            tx_type,
            success,
            cumulative_gas_used,
            logs_bloom,
            logs,
        })
    }
}
