//! Platform bring-up.

use crate::mmio::set32;

const CAR_MISC_CLK_ENB: u32 = 0x6000_6048;

// Bit 28 gates APB visibility of the fuse/revision block
const MISC_CLK_ENB_FUSE_VISIBLE: u32 = 1 << 28;

/// Initial hardware configuration.
///
/// Idempotent: the stage can be re-entered by a warm reboot without a
/// chip reset, so everything here is safe to run again.
///
/// # Safety
/// Must run before any other register access in this crate.
pub unsafe fn hw_init() {
    // Make the fuse block (chip revision probe) visible on the APB.
    set32(CAR_MISC_CLK_ENB, MISC_CLK_ENB_FUSE_VISIBLE);
}
