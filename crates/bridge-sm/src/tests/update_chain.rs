use alloy_primitives::Bytes;
use bridge_db::MemStore;
use bridge_primitives::header::RawHeader;
use bridge_test_utils::headers::{encode_header, extend, genesis, raws};

use super::*;
use crate::ResultCode;

#[test]
fn first_update_sets_genesis() {
    let cfg = cfg();
    let mut sm = BridgeStateMachine::new(MemStore::new());
    let g = genesis(50);

    let tx = BridgeTx::from(UpdateChainTx {
        headers: vec![g.raw.clone()],
    });
    let result = sm.deliver_tx(cfg.clone(), &tx.encode().unwrap());

    assert!(result.is_ok(), "{result}");
    let chain = sm.header_chain(&cfg);
    assert_eq!(chain.genesis().unwrap(), g.header);
    assert_eq!(chain.last_finalized().unwrap(), 50);
}

#[test]
fn first_update_applies_the_rest_of_its_batch() {
    let cfg = cfg();
    let mut sm = BridgeStateMachine::new(MemStore::new());
    let g = genesis(GENESIS_HEIGHT);
    let mut batch = vec![g.clone()];
    batch.extend(extend(&g.header, 12, 0));

    let tx = BridgeTx::from(UpdateChainTx {
        headers: raws(&batch),
    });
    let result = sm.deliver_tx(cfg.clone(), &tx.encode().unwrap());

    assert!(result.is_ok(), "{result}");
    assert_eq!(sm.header_chain(&cfg).last_finalized().unwrap(), 101);
}

#[test]
fn twelve_headers_finalize_only_the_first() {
    let mut h = Harness::new();
    let batch = extend(&h.tip, 12, 0);

    let result = h.deliver(UpdateChainTx {
        headers: raws(&batch),
    });

    assert!(result.is_ok(), "{result}");
    let chain = h.sm.header_chain(&h.cfg);
    assert_eq!(chain.last_finalized().unwrap(), 101);
    assert_eq!(chain.finalized(101).unwrap(), Some(batch[0].header));
    for header in &batch[1..] {
        assert!(chain.is_buffered(&header.header.hash).unwrap());
        assert_eq!(chain.finalized(header.header.number).unwrap(), None);
    }
}

#[test]
fn unlinked_batch_is_rejected_without_effect() {
    let mut h = Harness::new();
    let mut batch = extend(&h.tip, 12, 0);
    batch.swap(3, 4);

    let result = h.deliver(UpdateChainTx {
        headers: raws(&batch),
    });

    assert_eq!(result.code, ResultCode::NonContiguousHeaderList);
    assert_eq!(h.last_finalized(), GENESIS_HEIGHT);
    let chain = h.sm.header_chain(&h.cfg);
    for header in &batch {
        assert!(!chain.is_buffered(&header.header.hash).unwrap());
    }
}

#[test]
fn conflicting_fork_is_rejected() {
    let mut h = Harness::new();
    let g = h.tip;
    assert!(h
        .deliver(UpdateChainTx {
            headers: raws(&extend(&g, 12, 0)),
        })
        .is_ok());

    let result = h.deliver(UpdateChainTx {
        headers: raws(&extend(&g, 13, 1)),
    });

    assert_eq!(result.code, ResultCode::ConflictingChain);
    assert_eq!(h.last_finalized(), 101);
}

#[test]
fn resubmission_is_accepted_as_a_no_op() {
    let mut h = Harness::new();
    let tx = UpdateChainTx {
        headers: raws(&extend(&h.tip, 12, 0)),
    };

    assert!(h.deliver(tx.clone()).is_ok());
    let again = h.deliver(tx);

    assert!(again.is_ok(), "{again}");
    assert_eq!(h.last_finalized(), 101);
}

#[test]
fn malformed_headers_are_rejected() {
    let mut h = Harness::new();

    let empty = h.deliver(UpdateChainTx { headers: vec![] });
    assert_eq!(empty.code, ResultCode::Malformed);

    let garbage = h.deliver(UpdateChainTx {
        headers: vec![RawHeader(Bytes::from_static(&[0xde, 0xad]))],
    });
    assert_eq!(garbage.code, ResultCode::Malformed);
}

#[test]
fn height_wrapping_batch_is_rejected() {
    let mut h = Harness::new();
    let top = encode_header(h.tip.hash, B256::ZERO, u64::MAX, 0);
    let top_hash = top.hash();
    let wrapped = encode_header(top_hash, B256::ZERO, 0, 0);

    let result = h.deliver(UpdateChainTx {
        headers: vec![top, wrapped],
    });

    assert_eq!(result.code, ResultCode::NonContiguousHeaderList);
    assert_eq!(h.last_finalized(), GENESIS_HEIGHT);
    assert!(!h.sm.header_chain(&h.cfg).is_buffered(&top_hash).unwrap());
}

#[test]
fn undecodable_transaction_is_malformed() {
    let mut h = Harness::new();
    let cfg = h.cfg.clone();

    let result = h.sm.deliver_tx(cfg, &[0xff, 0xff, 0xff, 0xff, 0x00]);
    assert_eq!(result.code, ResultCode::Malformed);
    assert_eq!(h.sm.check_tx(&[]).code, ResultCode::Malformed);
}

#[test]
fn check_tx_does_not_apply() {
    let h = Harness::new();
    let tx = BridgeTx::from(UpdateChainTx {
        headers: raws(&extend(&h.tip, 12, 0)),
    });

    assert!(h.sm.check_tx(&tx.encode().unwrap()).is_ok());
    assert_eq!(h.last_finalized(), GENESIS_HEIGHT);
}
