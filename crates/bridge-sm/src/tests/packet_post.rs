use alloy_primitives::{Address, Bytes, B256, U256};
use bridge_codemap::{abi, Payload};
use bridge_db::{KvStore, KvStoreExt};
use proptest::prelude::*;

use super::*;
use crate::{keys::packet_key, ResultCode};

#[test]
fn deposit_is_credited_exactly_once() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let receipts = deposit_block(U256::from(1_000), 5);
    let proof = h.prove(&receipts, 3);

    let first = h.post("Deposit", proof.clone());
    assert!(first.is_ok(), "{first}");
    assert_eq!(h.balance(), U256::from(1_000));

    let replay = h.post("Deposit", proof);
    assert_eq!(replay.code, ResultCode::PacketAlreadyExists);
    assert_eq!(h.balance(), U256::from(1_000));
}

#[test]
fn applied_packet_is_recorded() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let proof = h.prove(&deposit_block(U256::from(7), 5), 3);
    assert!(h.post("Deposit", proof).is_ok());

    let stored = h
        .sm
        .store()
        .get_value::<Payload>(&packet_key(&token_contract(), 5))
        .unwrap()
        .unwrap();
    assert_eq!(stored.sequence(), 5);
}

#[test]
fn unregistered_contract_is_rejected() {
    let mut h = Harness::new();

    let proof = h.prove(&deposit_block(U256::from(1), 1), 3);
    let result = h.post("Deposit", proof);

    assert_eq!(result.code, ResultCode::ContractNotRegistered);
    assert_eq!(h.balance(), U256::ZERO);
}

#[test]
fn unknown_event_name_is_rejected() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let proof = h.prove(&deposit_block(U256::from(1), 1), 3);

    assert_eq!(
        h.post("DataSubmitted", proof.clone()).code,
        ResultCode::InvalidEventName
    );
    assert_eq!(h.post("Withdrawal", proof).code, ResultCode::InvalidEventName);
}

#[test]
fn undecodable_log_is_rejected_and_not_recorded() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let mut receipts = filler_receipts(4);
    receipts[1] = receipt(
        90_000,
        vec![log(
            token_contract(),
            vec![abi::Deposit::SIGNATURE_HASH, B256::ZERO],
            vec![0u8; 17],
        )],
    );
    let proof = h.prove(&receipts, 1);

    assert_eq!(h.post("Deposit", proof).code, ResultCode::DecodeError);
    assert_eq!(h.balance(), U256::ZERO);
}

#[test]
fn proof_for_unfinalized_block_is_rejected() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let receipts = deposit_block(U256::from(1), 1);
    let proof = ReceiptProof::build(&receipts, 3, 5_000).unwrap();

    assert_eq!(h.post("Deposit", proof).code, ResultCode::BlockNotFinalized);
}

#[test]
fn proof_against_another_root_is_rejected() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let receipts = deposit_block(U256::from(1), 1);
    let block = h.finalize_block(B256::repeat_byte(0x55));
    let proof = ReceiptProof::build(&receipts, 3, block.number).unwrap();

    assert_eq!(h.post("Deposit", proof).code, ResultCode::InvalidProof);
    assert_eq!(h.balance(), U256::ZERO);
}

#[test]
fn tampered_receipt_is_rejected() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let receipts = deposit_block(U256::from(1), 1);
    let mut proof = h.prove(&receipts, 3);

    let mut forged = receipts[3].clone();
    forged.logs = vec![deposit_log(token_contract(), U256::from(1_000_000), 1)];
    proof.receipt = forged.encoded_2718().into();

    assert_eq!(h.post("Deposit", proof).code, ResultCode::InvalidProof);
    assert_eq!(h.balance(), U256::ZERO);
}

#[test]
fn overflowing_credit_leaves_no_trace() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let first = h.prove(&deposit_block(U256::MAX, 1), 3);
    assert!(h.post("Deposit", first).is_ok());

    let second = h.prove(&deposit_block(U256::from(1), 2), 3);
    assert_eq!(h.post("Deposit", second).code, ResultCode::Overflow);

    assert_eq!(h.balance(), U256::MAX);
    assert!(!h
        .sm
        .store()
        .contains(&packet_key(&token_contract(), 2))
        .unwrap());
}

#[test]
fn data_submission_is_recorded_without_credit() {
    let mut h = Harness::new();
    let contract = Address::repeat_byte(0xda);
    assert!(h.register(contract, DATA_CODE).is_ok());

    let event = abi::DataSubmitted {
        submitter: Address::repeat_byte(0x02),
        data: Bytes::from_static(b"checkpoint"),
        sequence: 11,
    };
    let data = event.encode_log_data();
    let mut receipts = filler_receipts(2);
    receipts[0] = receipt(
        30_000,
        vec![log(contract, data.topics().to_vec(), data.data.clone())],
    );
    let proof = h.prove(&receipts, 0);

    assert!(h.post("DataSubmitted", proof.clone()).is_ok());
    assert!(h.sm.store().contains(&packet_key(&contract, 11)).unwrap());
    assert_eq!(h.post("DataSubmitted", proof).code, ResultCode::PacketAlreadyExists);
}

#[test]
fn second_log_of_a_receipt_can_be_posted() {
    let mut h = Harness::new();
    assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

    let mut receipts = filler_receipts(3);
    receipts[2] = receipt(
        70_000,
        vec![
            deposit_log(token_contract(), U256::from(10), 1),
            deposit_log(token_contract(), U256::from(20), 2),
        ],
    );
    let proof = h.prove(&receipts, 2);

    assert!(h.post("Deposit", proof.clone().with_log_index(1)).is_ok());
    assert_eq!(h.balance(), U256::from(20));
    assert!(h.post("Deposit", proof).is_ok());
    assert_eq!(h.balance(), U256::from(30));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn balance_changes_once_per_sequence(sequences in prop::collection::vec(0u64..6, 1..10)) {
        let mut h = Harness::new();
        prop_assert!(h.register(token_contract(), TOKEN_CODE).is_ok());

        let receipts: Vec<_> = sequences
            .iter()
            .map(|seq| receipt(21_000, vec![deposit_log(token_contract(), U256::from(3), *seq)]))
            .collect();
        let block = h.finalize_block(receipts_root(&receipts));

        let mut seen = std::collections::HashSet::new();
        for (i, seq) in sequences.iter().enumerate() {
            let proof = ReceiptProof::build(&receipts, i as u64, block.number).unwrap();
            let result = h.post("Deposit", proof);
            if seen.insert(*seq) {
                prop_assert!(result.is_ok(), "{}", result);
            } else {
                prop_assert_eq!(result.code, ResultCode::PacketAlreadyExists);
            }
        }

        prop_assert_eq!(h.balance(), U256::from(3 * seen.len() as u64));
    }
}
