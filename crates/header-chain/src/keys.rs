//! Key layout of the bridge module.

use alloy_primitives::B256;

/// Prefix of every key owned by the bridge module.
pub const MODULE_PREFIX: &str = "bridge/";

/// Key of the genesis header.
pub const GENESIS_KEY: &[u8] = b"bridge/info/genesis";

/// Key of the last finalized height.
pub const LAST_FINALIZED_KEY: &[u8] = b"bridge/info/last_finalized";

const BUFFER_PREFIX: &[u8] = b"bridge/buffer/";
const FINAL_PREFIX: &[u8] = b"bridge/final/";

/// Key of a buffered header.
pub fn buffer_key(hash: &B256) -> Vec<u8> {
    [BUFFER_PREFIX, hash.as_slice()].concat()
}

/// Key of the finalized header at `number`.
///
/// Heights are big-endian so that finalized headers sort by height.
pub fn final_key(number: u64) -> Vec<u8> {
    [FINAL_PREFIX, &number.to_be_bytes()[..]].concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_spaces_are_disjoint() {
        let hash = B256::repeat_byte(7);
        assert!(buffer_key(&hash).starts_with(MODULE_PREFIX.as_bytes()));
        assert!(final_key(7).starts_with(MODULE_PREFIX.as_bytes()));
        assert!(!final_key(7).starts_with(BUFFER_PREFIX));
        assert!(!buffer_key(&hash).starts_with(FINAL_PREFIX));
    }

    #[test]
    fn final_keys_sort_by_height() {
        assert!(final_key(255) < final_key(256));
        assert!(final_key(1) < final_key(1 << 40));
    }
}
