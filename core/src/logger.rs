//! Boot-stage event log.
//!
//! A fixed set of static message slots with an atomic cursor. Failure
//! paths record a short tag here before printing to the console, so the
//! trail survives a screen clear. Slots past the limit are dropped; the
//! log is append-only for the life of the stage.

use core::sync::atomic::{AtomicUsize, Ordering};

const LOG_SLOTS: usize = 64;

static mut LOG_SLOTS_BUF: [Option<&'static str>; LOG_SLOTS] = [None; LOG_SLOTS];
static LOG_CURSOR: AtomicUsize = AtomicUsize::new(0);

/// Record a log tag. Messages are static so logging never allocates.
pub fn log(tag: &'static str) {
    let idx = LOG_CURSOR.fetch_add(1, Ordering::SeqCst);
    if idx < LOG_SLOTS {
        unsafe {
            LOG_SLOTS_BUF[idx] = Some(tag);
        }
    }
}

/// All recorded entries, oldest first.
pub fn entries() -> &'static [Option<&'static str>] {
    let count = LOG_CURSOR.load(Ordering::SeqCst).min(LOG_SLOTS);
    unsafe { &LOG_SLOTS_BUF[..count] }
}

/// The most recent entry, if any survived the slot limit.
pub fn last() -> Option<&'static str> {
    let count = LOG_CURSOR.load(Ordering::SeqCst).min(LOG_SLOTS);
    if count == 0 {
        return None;
    }
    unsafe { LOG_SLOTS_BUF[count - 1] }
}

pub fn count() -> usize {
    LOG_CURSOR.load(Ordering::SeqCst).min(LOG_SLOTS)
}

// Macro for easier logging
#[macro_export]
macro_rules! log_info {
    ($msg:expr) => {
        $crate::logger::log($msg)
    };
}
