//! Event ABIs of the supported source contracts.
#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// Tokens locked on the source chain for release to `to` on the destination chain.
    #[derive(Debug, PartialEq, Eq)]
    event Deposit(address indexed from, address to, uint256 value, address token, uint64 sequence);

    /// Opaque data published for the destination chain.
    #[derive(Debug, PartialEq, Eq)]
    event DataSubmitted(address indexed submitter, bytes data, uint64 sequence);
}
