use alloy_primitives::{Bytes, B256};
use alloy_rlp::Encodable;
use alloy_trie::{
    proof::{verify_proof, ProofRetainer},
    HashBuilder, Nibbles,
};
use bridge_primitives::receipt::{Log, Receipt};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::ProofError;

/// Trie path of the receipt at `tx_index`: the nibbles of `rlp(tx_index)`.
pub fn receipt_trie_key(tx_index: u64) -> Nibbles {
    let mut key = Vec::with_capacity(9);
    tx_index.encode(&mut key);
    Nibbles::unpack(&key)
}

fn sorted_leaves(receipts: &[Receipt]) -> Vec<(Nibbles, Vec<u8>)> {
    let mut leaves: Vec<_> = receipts
        .iter()
        .enumerate()
        .map(|(i, receipt)| (receipt_trie_key(i as u64), receipt.encoded_2718()))
        .collect();
    leaves.sort_by(|a, b| a.0.cmp(&b.0));
    leaves
}

/// Computes the receipts root of a block from its receipts in transaction order.
pub fn receipts_root(receipts: &[Receipt]) -> B256 {
    let mut builder = HashBuilder::default();
    for (key, value) in sorted_leaves(receipts) {
        builder.add_leaf(key, &value);
    }
    builder.root()
}

/// Membership proof of one receipt in a block's receipts trie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptProof {
    /// The receipt in its trie encoding.
    pub receipt: Bytes,

    /// Trie nodes from the root down to the receipt's leaf.
    pub proof_nodes: Vec<Bytes>,

    /// Position of the transaction in its block.
    pub tx_index: u64,

    /// Height of the block whose receipts root the proof is checked against.
    pub block_number: u64,

    /// Position of the proven log within the receipt.
    #[serde(default)]
    pub log_index: u32,
}

impl ReceiptProof {
    /// Builds a proof for the receipt at `tx_index` out of the block's full receipt list.
    ///
    /// The proof points at the receipt's first log; use [`Self::with_log_index`] to select
    /// another one.
    pub fn build(
        receipts: &[Receipt],
        tx_index: u64,
        block_number: u64,
    ) -> Result<Self, ProofError> {
        let target = usize::try_from(tx_index)
            .ok()
            .and_then(|i| receipts.get(i))
            .ok_or(ProofError::ReceiptNotFound {
                tx_index,
                block_number,
            })?;

        let target_key = receipt_trie_key(tx_index);
        let retainer = ProofRetainer::new(vec![target_key]);
        let mut builder = HashBuilder::default().with_proof_retainer(retainer);
        for (key, value) in sorted_leaves(receipts) {
            builder.add_leaf(key, &value);
        }

        let root = builder.root();
        let proof_nodes = builder
            .take_proof_nodes()
            .matching_nodes_sorted(&target_key)
            .into_iter()
            .map(|(_, node)| node)
            .collect::<Vec<_>>();

        trace!(%root, tx_index, block_number, nodes = proof_nodes.len(), "built receipt proof");

        Ok(Self {
            receipt: target.encoded_2718().into(),
            proof_nodes,
            tx_index,
            block_number,
            log_index: 0,
        })
    }

    /// Selects which log of the receipt the proof refers to.
    pub fn with_log_index(mut self, log_index: u32) -> Self {
        self.log_index = log_index;
        self
    }

    /// Checks the proof against `receipts_root`.
    ///
    /// Any structural problem (missing or altered node, wrong index, altered receipt) makes the
    /// proof invalid; no error is surfaced.
    pub fn verify(&self, receipts_root: B256) -> bool {
        let key = receipt_trie_key(self.tx_index);
        verify_proof(
            receipts_root,
            key,
            Some(self.receipt.to_vec()),
            self.proof_nodes.iter(),
        )
        .is_ok()
    }

    /// Decodes the proven receipt.
    pub fn receipt(&self) -> Result<Receipt, ProofError> {
        Ok(Receipt::decode_2718(&self.receipt)?)
    }

    /// Returns the log the proof refers to.
    pub fn extract_log(&self) -> Result<Log, ProofError> {
        let receipt = self.receipt()?;
        receipt
            .logs
            .into_iter()
            .nth(self.log_index as usize)
            .ok_or(ProofError::NoLogInReceipt(self.log_index))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256};
    use bridge_test_utils::receipts::{filler_receipts, log, receipt};
    use proptest::prelude::*;

    use super::*;

    fn block_with_logs(count: usize, with_logs_at: usize) -> Vec<Receipt> {
        let mut receipts = filler_receipts(count);
        receipts[with_logs_at] = receipt(
            1_000_000,
            vec![
                log(
                    Address::repeat_byte(0x42),
                    vec![B256::repeat_byte(0x01)],
                    vec![0xab; 64],
                ),
                log(
                    Address::repeat_byte(0x43),
                    vec![B256::repeat_byte(0x02), B256::repeat_byte(0x03)],
                    vec![0xcd; 32],
                ),
            ],
        );
        receipts
    }

    #[test]
    fn proof_verifies_against_its_root() {
        let receipts = block_with_logs(20, 7);
        let root = receipts_root(&receipts);

        let proof = ReceiptProof::build(&receipts, 7, 1_000).unwrap();
        assert!(proof.verify(root));
        assert_eq!(proof.receipt().unwrap(), receipts[7]);
    }

    #[test]
    fn single_receipt_block() {
        let receipts = block_with_logs(1, 0);
        let root = receipts_root(&receipts);

        let proof = ReceiptProof::build(&receipts, 0, 1).unwrap();
        assert!(proof.verify(root));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let receipts = filler_receipts(3);
        assert_eq!(
            ReceiptProof::build(&receipts, 3, 55),
            Err(ProofError::ReceiptNotFound {
                tx_index: 3,
                block_number: 55
            })
        );
        assert!(matches!(
            ReceiptProof::build(&[], 0, 55),
            Err(ProofError::ReceiptNotFound { .. })
        ));
    }

    #[test]
    fn wrong_root_fails() {
        let receipts = block_with_logs(5, 2);
        let proof = ReceiptProof::build(&receipts, 2, 9).unwrap();
        assert!(!proof.verify(B256::repeat_byte(0x99)));
    }

    #[test]
    fn wrong_index_fails() {
        let receipts = block_with_logs(12, 4);
        let root = receipts_root(&receipts);

        let mut proof = ReceiptProof::build(&receipts, 4, 9).unwrap();
        proof.tx_index = 5;
        assert!(!proof.verify(root));
    }

    #[test]
    fn dropped_node_fails() {
        let receipts = block_with_logs(40, 17);
        let root = receipts_root(&receipts);

        let mut proof = ReceiptProof::build(&receipts, 17, 9).unwrap();
        assert!(proof.proof_nodes.len() > 1);
        proof.proof_nodes.remove(0);
        assert!(!proof.verify(root));
    }

    #[test]
    fn extract_log_honours_index() {
        let receipts = block_with_logs(4, 1);
        let proof = ReceiptProof::build(&receipts, 1, 2).unwrap();

        assert_eq!(proof.extract_log().unwrap(), receipts[1].logs[0]);
        let second = proof.clone().with_log_index(1);
        assert_eq!(second.extract_log().unwrap(), receipts[1].logs[1]);
        let third = proof.with_log_index(2);
        assert_eq!(third.extract_log(), Err(ProofError::NoLogInReceipt(2)));
    }

    #[test]
    fn log_less_receipt_has_no_log() {
        let receipts = filler_receipts(3);
        let proof = ReceiptProof::build(&receipts, 0, 2).unwrap();
        assert_eq!(proof.extract_log(), Err(ProofError::NoLogInReceipt(0)));
    }

    proptest! {
        #[test]
        fn every_index_round_trips(count in 1usize..64, pick in any::<prop::sample::Index>()) {
            let target = pick.index(count);
            let receipts = block_with_logs(count, target);
            let root = receipts_root(&receipts);

            let proof = ReceiptProof::build(&receipts, target as u64, 77).unwrap();
            prop_assert!(proof.verify(root));
            prop_assert_eq!(proof.extract_log().unwrap(), receipts[target].logs[0].clone());
        }

        #[test]
        fn flipped_receipt_byte_fails(count in 2usize..32, byte in 0usize..300, flip in 1u8..=255) {
            let receipts = block_with_logs(count, 1);
            let root = receipts_root(&receipts);

            let mut proof = ReceiptProof::build(&receipts, 1, 77).unwrap();
            let mut bytes = proof.receipt.to_vec();
            let pos = byte % bytes.len();
            bytes[pos] ^= flip;
            proof.receipt = bytes.into();
            prop_assert!(!proof.verify(root));
        }

        #[test]
        fn flipped_node_byte_fails(
            count in 2usize..48,
            node in any::<prop::sample::Index>(),
            byte in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let target = count / 2;
            let receipts = block_with_logs(count, target);
            let root = receipts_root(&receipts);

            let mut proof = ReceiptProof::build(&receipts, target as u64, 77).unwrap();
            let node = node.index(proof.proof_nodes.len());
            let mut bytes = proof.proof_nodes[node].to_vec();
            let pos = byte.index(bytes.len());
            bytes[pos] ^= flip;
            proof.proof_nodes[node] = bytes.into();
            prop_assert!(!proof.verify(root));
        }
    }
}
