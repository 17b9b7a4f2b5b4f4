//! Chip revision probe.
//!
//! The hardware revision lives in the MISC block's HIDREV register.
//! Revisions with a major of 2 or above carry the locked-down boot ROM:
//! on those, the alternate-firmware payload class is off the table and
//! the partial-key dump is the only way at the wiped keyslots.

use crate::mmio::read32;

const APB_MISC_GP_HIDREV: u32 = 0x7000_0804;

const HIDREV_MAJOR_SHIFT: u32 = 4;
const HIDREV_MAJOR_MASK: u32 = 0xF;

/// Major revision field of the running chip.
pub fn chip_major_revision() -> u32 {
    unsafe { (read32(APB_MISC_GP_HIDREV) >> HIDREV_MAJOR_SHIFT) & HIDREV_MAJOR_MASK }
}

/// True on the restricted hardware revision (locked-down boot ROM).
pub fn is_restricted_revision() -> bool {
    chip_major_revision() >= 2
}
