use thiserror::Error;

/// Errors raised while building or reading a receipt proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// The requested transaction index is outside the block's receipt list.
    #[error("no receipt at index {tx_index} in block {block_number}")]
    ReceiptNotFound {
        /// Requested index.
        tx_index: u64,
        /// Block the receipts belong to.
        block_number: u64,
    },

    /// The receipt carries no log at the requested position.
    #[error("receipt has no log at index {0}")]
    NoLogInReceipt(u32),

    /// The receipt bytes carried by the proof do not decode.
    #[error("malformed receipt: {0}")]
    MalformedReceipt(#[from] alloy_rlp::Error),
}
