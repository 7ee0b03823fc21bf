//! Builders for RLP-encoded header chains.

use alloy_primitives::{Address, Bloom, Bytes, B256, U256};
use alloy_rlp::Encodable;
use bridge_primitives::header::{Header, RawHeader};

/// Encodes a header with the given linkage fields.
///
/// `salt` lands in the timestamp field; two headers that differ only in `salt` have different
/// hashes, which is how tests build competing forks.
pub fn encode_header(parent_hash: B256, receipts_root: B256, number: u64, salt: u64) -> RawHeader {
    let mut payload = Vec::new();
    parent_hash.encode(&mut payload);
    B256::ZERO.encode(&mut payload);
    Address::ZERO.encode(&mut payload);
    B256::ZERO.encode(&mut payload);
    B256::ZERO.encode(&mut payload);
    receipts_root.encode(&mut payload);
    Bloom::ZERO.encode(&mut payload);
    U256::from(17_179_869_184u64).encode(&mut payload);
    number.encode(&mut payload);
    5_000u64.encode(&mut payload);
    0u64.encode(&mut payload);
    (1_438_269_973u64 + salt).encode(&mut payload);
    Bytes::new().encode(&mut payload);
    B256::ZERO.encode(&mut payload);
    [0u8; 8].encode(&mut payload);

    let mut out = Vec::new();
    alloy_rlp::Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(&payload);
    RawHeader::from(out)
}

/// A header together with its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestHeader {
    /// Encoded form, as carried by transactions.
    pub raw: RawHeader,

    /// Decoded form.
    pub header: Header,
}

impl TestHeader {
    fn new(raw: RawHeader) -> Self {
        let header = raw.decode().expect("fixture headers always decode");
        Self { raw, header }
    }
}

/// A root header at `number` with no meaningful parent.
pub fn genesis(number: u64) -> TestHeader {
    TestHeader::new(encode_header(B256::ZERO, B256::ZERO, number, 0))
}

/// Builds `count` headers extending `parent`.
pub fn extend(parent: &Header, count: usize, salt: u64) -> Vec<TestHeader> {
    extend_with_roots(parent, &vec![B256::ZERO; count], salt)
}

/// Builds one header per entry of `receipts_roots`, extending `parent`.
pub fn extend_with_roots(parent: &Header, receipts_roots: &[B256], salt: u64) -> Vec<TestHeader> {
    let mut out: Vec<TestHeader> = Vec::with_capacity(receipts_roots.len());
    let mut tip = *parent;
    for root in receipts_roots {
        let next = TestHeader::new(encode_header(tip.hash, *root, tip.number + 1, salt));
        tip = next.header;
        out.push(next);
    }
    out
}

/// Collects the encodings of `headers`.
pub fn raws(headers: &[TestHeader]) -> Vec<RawHeader> {
    headers.iter().map(|h| h.raw.clone()).collect()
}
