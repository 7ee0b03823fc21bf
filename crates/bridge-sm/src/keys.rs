//! Keys owned by the state machine beyond the header chain's.

use alloy_primitives::Address;
use bridge_codemap::Denom;

const CONTRACT_PREFIX: &[u8] = b"bridge/contract/";
const PACKET_PREFIX: &[u8] = b"bridge/packet/";
const BANK_PREFIX: &[u8] = b"bank/";

/// Key of a contract registration; the value is the code identifier.
pub fn contract_key(address: &Address) -> Vec<u8> {
    [CONTRACT_PREFIX, address.as_slice()].concat()
}

/// Key of an applied packet; the value is its decoded payload.
pub fn packet_key(contract: &Address, sequence: u64) -> Vec<u8> {
    [PACKET_PREFIX, contract.as_slice(), &sequence.to_be_bytes()[..]].concat()
}

/// Key of an account balance, as a 32-byte big-endian integer.
pub fn balance_key(account: &Address, denom: &Denom) -> Vec<u8> {
    [
        BANK_PREFIX,
        account.as_slice(),
        &b"/"[..],
        denom.contract.as_slice(),
        denom.token.as_slice(),
    ]
    .concat()
}
