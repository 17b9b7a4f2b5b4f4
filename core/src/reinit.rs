//! Post-load hardware re-initialization boundary.

/// Hook run after a payload image is staged and storage is released,
/// immediately before the hand-off jump.
///
/// `magic` is the boot word extracted from the image (see the chainload
/// protocol); `alt_firmware` selects the alternate-firmware re-init
/// path, which also arms the auxiliary memory window.
pub trait HwReinit {
    fn reinit(&mut self, alt_firmware: bool, magic: u32);
}
