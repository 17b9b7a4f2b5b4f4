//! Key-derivation collaborator boundary.
//!
//! The derivation engine itself (keyslot access, crypto) lives below
//! this crate; the boot stage only ever triggers it and inspects the
//! partial-dump status code.

/// Status codes from a partial-key dump after which the hardware
/// keyslots are no longer usable until the next cold boot.
const KEYSLOTS_INVALIDATED: [i32; 2] = [0, 3];

/// True if `status` means the dump wiped the keyslots it walked.
pub fn invalidates_keyslots(status: i32) -> bool {
    KEYSLOTS_INVALIDATED.contains(&status)
}

/// Key extraction operations exposed to the action menu.
pub trait KeyVault {
    /// Derive and save the full key set. `use_emulated` selects the
    /// emulated storage image as the key source instead of the system
    /// storage.
    fn dump_keys(&mut self, use_emulated: bool);

    /// Derive and save the amiibo tag key set.
    fn derive_amiibo_keys(&mut self);

    /// Zero-write partial dump over `count` keyslots starting at
    /// `slot_start`. Returns the engine status code; see
    /// [`invalidates_keyslots`].
    fn save_partial_keys(&mut self, slot_start: u32, count: u32, keep_slots: bool) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidating_statuses() {
        assert!(invalidates_keyslots(0));
        assert!(invalidates_keyslots(3));
        assert!(!invalidates_keyslots(1));
        assert!(!invalidates_keyslots(-1));
    }
}
