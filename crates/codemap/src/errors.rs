use alloy_primitives::Address;
use bridge_db::DbError;
use thiserror::Error;

/// Errors raised while resolving, decoding or applying contract events.
#[derive(Debug, Error)]
pub enum CodeError {
    /// No code with this identifier is known.
    #[error("unknown code {0}")]
    UnknownCode(String),

    /// A code with this identifier is already registered.
    #[error("duplicate code {0}")]
    DuplicateCode(String),

    /// The code has no event with this name.
    #[error("code {code} has no event named {event}")]
    InvalidEventName {
        /// Code consulted.
        code: String,
        /// Requested event name.
        event: String,
    },

    /// The log does not match the event's ABI.
    #[error("abi decode: {0}")]
    Decode(#[from] alloy_sol_types::Error),

    /// The packet was applied before.
    #[error("packet {sequence} from {contract} already applied")]
    PacketAlreadyExists {
        /// Emitting contract.
        contract: Address,
        /// Sequence of the packet.
        sequence: u64,
    },

    /// A balance would overflow.
    #[error("balance overflow")]
    Overflow,

    /// The state backing the context failed.
    #[error("storage: {0}")]
    Storage(#[from] DbError),
}
