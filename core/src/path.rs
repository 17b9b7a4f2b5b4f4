//! Logical path handling for the boot volume.
//!
//! All payload paths live in a flat namespace rooted at the volume
//! marker `sd:/`. A selected leaf that already carries the root marker
//! is taken verbatim; anything else is joined onto its base directory
//! with exactly one separator.

use alloc::string::String;

/// Marker that roots a path at the boot volume.
pub const VOLUME_ROOT: &str = "sd:/";

/// Returns true if `path` is already rooted at the boot volume.
pub fn is_rooted(path: &str) -> bool {
    path.starts_with(VOLUME_ROOT)
}

/// Compose the full logical path for a selected leaf.
///
/// A rooted leaf wins over the base; otherwise the two are joined with
/// a single `/`, regardless of whether the base carries a trailing one.
pub fn join(base: &str, leaf: &str) -> String {
    if is_rooted(leaf) {
        return String::from(leaf);
    }

    let base = base.trim_end_matches('/');
    let mut full = String::with_capacity(base.len() + 1 + leaf.len());
    full.push_str(base);
    full.push('/');
    full.push_str(leaf);
    full
}

/// The file-name component of a logical path.
pub fn leaf_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_plain_leaf() {
        assert_eq!(
            join("sd:/bootloader/payloads", "game.bin"),
            "sd:/bootloader/payloads/game.bin"
        );
    }

    #[test]
    fn test_join_rooted_leaf_is_verbatim() {
        assert_eq!(
            join("sd:/bootloader/payloads", "sd:/atmosphere/reboot_payload.bin"),
            "sd:/atmosphere/reboot_payload.bin"
        );
    }

    #[test]
    fn test_join_never_doubles_separator() {
        assert_eq!(join("sd:/payloads/", "a.bin"), "sd:/payloads/a.bin");
    }

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name("sd:/bootloader/payloads/game.bin"), "game.bin");
        assert_eq!(leaf_name("update.bin"), "update.bin");
    }
}
