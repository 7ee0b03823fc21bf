//! Transaction-level tests of the bridge state machine.

mod packet_post;
mod update_chain;

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolEvent;
use bridge_codemap::{abi, CodeKind, Codemap, Denom};
use bridge_db::MemStore;
use bridge_primitives::{header::Header, receipt::Receipt};
use bridge_receipt_proof::{receipts_root, ReceiptProof};
use bridge_test_utils::{
    headers::{extend_with_roots, genesis, raws},
    receipts::{filler_receipts, log, receipt},
};

use crate::{
    BridgeCfg, BridgeStateMachine, BridgeTx, PacketPostTx, RegisterContractTx, TxResult,
    UpdateChainTx,
};

pub(super) const TOKEN_CODE: &str = "erc20";
pub(super) const DATA_CODE: &str = "notes";

pub(super) const GENESIS_HEIGHT: u64 = 100;

pub(super) fn token_contract() -> Address {
    Address::repeat_byte(0xb1)
}

pub(super) fn token() -> Address {
    Address::repeat_byte(0x7e)
}

pub(super) fn recipient() -> Address {
    Address::repeat_byte(0xd0)
}

pub(super) fn denom() -> Denom {
    Denom {
        contract: token_contract(),
        token: token(),
    }
}

pub(super) fn cfg() -> Arc<BridgeCfg> {
    let mut codemap = Codemap::new();
    codemap.register(TOKEN_CODE, CodeKind::Token).unwrap();
    codemap.register(DATA_CODE, CodeKind::Data).unwrap();
    Arc::new(BridgeCfg::new(codemap))
}

pub(super) fn deposit_log(
    contract: Address,
    value: U256,
    sequence: u64,
) -> bridge_primitives::receipt::Log {
    let event = abi::Deposit {
        from: Address::repeat_byte(0x01),
        to: recipient(),
        value,
        token: token(),
        sequence,
    };
    let data = event.encode_log_data();
    log(contract, data.topics().to_vec(), data.data.clone())
}

/// A block of filler receipts with one deposit receipt at index 3.
pub(super) fn deposit_block(value: U256, sequence: u64) -> Vec<Receipt> {
    let mut receipts = filler_receipts(6);
    receipts[3] = receipt(
        500_000,
        vec![deposit_log(token_contract(), value, sequence)],
    );
    receipts
}

/// A state machine seeded with a genesis header, tracking the tip it has been fed.
pub(super) struct Harness {
    pub(super) sm: BridgeStateMachine<MemStore>,
    pub(super) cfg: Arc<BridgeCfg>,
    pub(super) tip: Header,
}

impl Harness {
    pub(super) fn new() -> Self {
        let cfg = cfg();
        let mut sm = BridgeStateMachine::new(MemStore::new());
        let g = genesis(GENESIS_HEIGHT);
        sm.initialize(&cfg, &g.raw).unwrap();

        Self {
            sm,
            cfg,
            tip: g.header,
        }
    }

    pub(super) fn deliver(&mut self, tx: impl Into<BridgeTx>) -> TxResult {
        let bytes = tx.into().encode().unwrap();
        self.sm.deliver_tx(self.cfg.clone(), &bytes)
    }

    pub(super) fn last_finalized(&self) -> u64 {
        self.sm.header_chain(&self.cfg).last_finalized().unwrap()
    }

    /// Submits enough headers to finalize a new block carrying `receipts_root`, and returns
    /// that block's header.
    pub(super) fn finalize_block(&mut self, receipts_root: B256) -> Header {
        let mut roots = vec![B256::ZERO; self.cfg.confirmations as usize];
        roots[0] = receipts_root;
        let batch = extend_with_roots(&self.tip, &roots, 0);

        let result = self.deliver(UpdateChainTx {
            headers: raws(&batch),
        });
        assert!(result.is_ok(), "{result}");

        self.tip = batch[batch.len() - 1].header;
        let block = batch[0].header;
        assert_eq!(self.last_finalized(), block.number);
        block
    }

    pub(super) fn register(&mut self, address: Address, code_id: &str) -> TxResult {
        self.deliver(RegisterContractTx {
            address,
            code_id: code_id.to_string(),
        })
    }

    pub(super) fn post(&mut self, event_name: &str, proof: ReceiptProof) -> TxResult {
        self.deliver(PacketPostTx {
            event_name: event_name.to_string(),
            proof,
        })
    }

    /// Finalizes a block made of `receipts` and returns a proof of the receipt at `tx_index`.
    pub(super) fn prove(&mut self, receipts: &[Receipt], tx_index: u64) -> ReceiptProof {
        let block = self.finalize_block(receipts_root(receipts));
        ReceiptProof::build(receipts, tx_index, block.number).unwrap()
    }

    pub(super) fn balance(&self) -> U256 {
        self.sm.balance(&recipient(), &denom()).unwrap()
    }
}
