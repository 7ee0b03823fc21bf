//! Receipt-trie membership proofs.
//!
//! A [`ReceiptProof`] binds one receipt, and through it one event log, to the receipts root of
//! the block that produced it. Proofs are built by the relayer from the block's full receipt
//! list and checked on the destination chain against a finalized header.

mod errors;
mod proof;

pub use errors::ProofError;
pub use proof::{receipt_trie_key, receipts_root, ReceiptProof};
