//! Power/reset controller.
//!
//! Every transition funnels through the PMC: the requested boot mode is
//! latched in a scratch register that survives the reset, then the main
//! reset line is pulled. The PMIC below this boundary honors the
//! power-off latch once the reset request lands.

use cinder_core::power::{PowerControl, PowerState};

use crate::mmio::{read32, write32};

const PMC_BASE: u32 = 0x7000_E400;
const PMC_CNTRL: u32 = PMC_BASE;
const PMC_SCRATCH0: u32 = PMC_BASE + 0x50;

const PMC_CNTRL_MAIN_RST: u32 = 1 << 4;

// Boot-mode flags consumed by the boot ROM / next stage after reset
const SCRATCH0_MODE_RECOVERY: u32 = 1 << 1;
const SCRATCH0_MODE_BYPASS_FUSES: u32 = 1 << 30;
const SCRATCH0_MODE_POWER_OFF: u32 = 1 << 31;

/// Reset-controller backed [`PowerControl`] implementation.
pub struct PmcControl;

impl PmcControl {
    pub const fn new() -> Self {
        Self
    }

    unsafe fn latch_mode(&self, flag: u32) {
        let scratch = read32(PMC_SCRATCH0);
        write32(PMC_SCRATCH0, scratch | flag);
    }
}

impl PowerControl for PmcControl {
    fn set_power_state(&mut self, state: PowerState) -> ! {
        unsafe {
            match state {
                PowerState::Reboot => {}
                PowerState::RebootRecovery => self.latch_mode(SCRATCH0_MODE_RECOVERY),
                PowerState::RebootBypassFuses => self.latch_mode(SCRATCH0_MODE_BYPASS_FUSES),
                PowerState::PowerOff => self.latch_mode(SCRATCH0_MODE_POWER_OFF),
            }
            write32(PMC_CNTRL, read32(PMC_CNTRL) | PMC_CNTRL_MAIN_RST);
        }

        // The reset request takes a few cycles to land; park until it does.
        loop {
            core::hint::spin_loop();
        }
    }
}
