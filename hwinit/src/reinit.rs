//! Post-load hardware re-initialization.
//!
//! Runs after a payload is staged and storage is released, right before
//! the hand-off jump. The payload expects the display controller parked
//! and the boot word latched where its early display init looks for it.

use cinder_core::reinit::HwReinit;

use crate::mmio::{set32, write32};

const CLK_RST_BASE: u32 = 0x6000_6000;
const CLK_RST_DEV_L_SET: u32 = CLK_RST_BASE + 0x300;

const DEV_L_DISP1: u32 = 1 << 27;

// Scratch slot the next stage reads for seamless display takeover
const PMC_SCRATCH_BOOT_WORD: u32 = 0x7000_E400 + 0x1B4;

/// SoC-level [`HwReinit`] implementation.
pub struct SocReinit;

impl SocReinit {
    pub const fn new() -> Self {
        Self
    }
}

impl HwReinit for SocReinit {
    fn reinit(&mut self, alt_firmware: bool, magic: u32) {
        unsafe {
            // Latch the boot word extracted from the image.
            write32(PMC_SCRATCH_BOOT_WORD, magic);

            if !alt_firmware {
                // Native payloads bring the display up themselves; put
                // the controller back in reset so they start clean.
                set32(CLK_RST_DEV_L_SET, DEV_L_DISP1);
            }
            // Alternate firmware takes the display over seamlessly and
            // keys off the latched boot word; leave the clock running.
        }
    }
}
