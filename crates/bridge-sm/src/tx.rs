//! Transactions accepted by the bridge state machine and their wire encoding.

use std::fmt;

use alloy_primitives::Address;
use bridge_primitives::header::RawHeader;
use bridge_receipt_proof::ReceiptProof;
use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;

/// Extends the tracked source chain with consecutive headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateChainTx {
    /// Headers in ascending height order.
    pub headers: Vec<RawHeader>,
}

/// Binds a source contract to a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterContractTx {
    /// Contract address on the source chain.
    pub address: Address,

    /// Code identifier in the codemap.
    pub code_id: String,
}

/// Carries a proven source-chain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketPostTx {
    /// Name of the event the proven log is decoded as.
    pub event_name: String,

    /// Membership proof of the receipt carrying the log.
    pub proof: ReceiptProof,
}

/// Every transaction kind. The variant index is the type discriminator on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeTx {
    /// See [`UpdateChainTx`].
    UpdateChain(UpdateChainTx),

    /// See [`RegisterContractTx`].
    RegisterContract(RegisterContractTx),

    /// See [`PacketPostTx`].
    PacketPost(PacketPostTx),
}

impl BridgeTx {
    /// Encodes the transaction for broadcast.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decodes a broadcast transaction.
    pub fn decode(bytes: &[u8]) -> Result<Self, BridgeError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Short name of the transaction kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpdateChain(_) => "update-chain",
            Self::RegisterContract(_) => "register-contract",
            Self::PacketPost(_) => "packet-post",
        }
    }

    /// Checks what can be checked without reading state.
    pub fn validate_basic(&self) -> Result<(), BridgeError> {
        match self {
            Self::UpdateChain(tx) => {
                if tx.headers.is_empty() {
                    return Err(BridgeError::Malformed("empty header list".to_string()));
                }
                for (i, raw) in tx.headers.iter().enumerate() {
                    raw.decode().map_err(|err| {
                        BridgeError::Malformed(format!("header {i} does not decode: {err}"))
                    })?;
                }
            }
            Self::RegisterContract(tx) => {
                if tx.code_id.is_empty() {
                    return Err(BridgeError::Malformed("empty code id".to_string()));
                }
                if tx.address == Address::ZERO {
                    return Err(BridgeError::Malformed("zero contract address".to_string()));
                }
            }
            Self::PacketPost(tx) => {
                if tx.event_name.is_empty() {
                    return Err(BridgeError::Malformed("empty event name".to_string()));
                }
                if tx.proof.receipt.is_empty() || tx.proof.proof_nodes.is_empty() {
                    return Err(BridgeError::Malformed("empty receipt proof".to_string()));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for BridgeTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateChain(tx) => write!(f, "update-chain({} headers)", tx.headers.len()),
            Self::RegisterContract(tx) => {
                write!(f, "register-contract({} as {})", tx.address, tx.code_id)
            }
            Self::PacketPost(tx) => write!(
                f,
                "packet-post({} in block {}, tx {})",
                tx.event_name, tx.proof.block_number, tx.proof.tx_index
            ),
        }
    }
}

impl From<UpdateChainTx> for BridgeTx {
    fn from(tx: UpdateChainTx) -> Self {
        Self::UpdateChain(tx)
    }
}

impl From<RegisterContractTx> for BridgeTx {
    fn from(tx: RegisterContractTx) -> Self {
        Self::RegisterContract(tx)
    }
}

impl From<PacketPostTx> for BridgeTx {
    fn from(tx: PacketPostTx) -> Self {
        Self::PacketPost(tx)
    }
}
