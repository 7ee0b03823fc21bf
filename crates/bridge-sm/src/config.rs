//! Configuration shared by every transaction the machine handles.

use bridge_codemap::Codemap;

/// Number of confirmations after which a source header is final, unless configured otherwise.
pub const DEFAULT_CONFIRMATIONS: u64 = 12;

/// Bridge-wide configuration.
///
/// Static over the lifetime of a deployment; changing it on a live chain changes the meaning of
/// already-stored state.
#[derive(Debug, Clone)]
pub struct BridgeCfg {
    /// Confirmation depth at which source headers are finalized.
    pub confirmations: u64,

    /// Codes contracts can be registered under.
    pub codemap: Codemap,
}

impl BridgeCfg {
    /// Creates a configuration with the default confirmation depth.
    pub fn new(codemap: Codemap) -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            codemap,
        }
    }

    /// Overrides the confirmation depth.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }
}
