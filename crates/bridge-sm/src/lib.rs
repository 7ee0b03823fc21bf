//! The bridge state machine run by the destination chain.
//!
//! The machine accepts three transaction kinds: header-chain updates, contract registrations and
//! packet posts carrying a proven source-chain event. Each transaction is validated, handled
//! against a write cache of the store and committed only if it succeeds, so a rejected
//! transaction leaves no trace.

pub mod config;
pub mod errors;
pub mod keys;
mod ledger;
pub mod result;
pub mod state_machine;
pub mod tx;

pub use config::BridgeCfg;
pub use errors::BridgeError;
pub use result::{ResultCode, TxResult};
pub use state_machine::{BridgeStateMachine, StateMachine, TxOutput};
pub use tx::{BridgeTx, PacketPostTx, RegisterContractTx, UpdateChainTx};

#[cfg(test)]
mod tests;
