//! Free-running microsecond timer.
//!
//! The SoC keeps a 1 MHz upcounter running from cold boot; delays are
//! busy-waits against it. Wrap-safe: differences are computed with
//! wrapping arithmetic, so a counter rollover mid-wait is harmless.

use crate::mmio::read32;

const TIMERUS_CNTR_1US: u32 = 0x6000_5010;

/// Current value of the microsecond counter.
pub fn ticks_us() -> u32 {
    unsafe { read32(TIMERUS_CNTR_1US) }
}

/// Busy-wait for at least `us` microseconds.
pub fn usleep(us: u32) {
    let start = ticks_us();
    while ticks_us().wrapping_sub(start) < us {
        core::hint::spin_loop();
    }
}

/// Busy-wait for at least `ms` milliseconds.
pub fn msleep(ms: u32) {
    usleep(ms.saturating_mul(1000));
}
