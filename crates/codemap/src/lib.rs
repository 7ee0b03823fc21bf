//! Contract codes: the event shapes a source contract emits and what applying each event does on
//! the destination chain.
//!
//! Operators bind code identifiers to built-in [`CodeKind`]s in a [`Codemap`], which is built
//! once at startup and handed to whoever needs it.

pub mod abi;
mod code;
mod codemap;
mod errors;
mod payload;

pub use code::{Code, CodeKind, EventKind, PacketContext};
pub use codemap::{CodeEntry, Codemap};
pub use errors::CodeError;
pub use payload::{DataPacket, Denom, Payload, TokenDeposit};
