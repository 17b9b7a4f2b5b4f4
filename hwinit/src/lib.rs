//! Hardware Initialization Layer
//!
//! Register-level pieces of the boot stage: MMIO accessors, the
//! microsecond timer, the heap allocator, the power/reset controller,
//! the chip revision probe, and the post-load re-init hook. Everything
//! here is re-runnable without a chip reset; the stage may be entered
//! again by a warm reboot.
//!
//! # What This Crate Does
//!
//! - Volatile 32-bit register access
//! - Busy-wait delays off the free-running microsecond counter
//! - Heap allocator over a fixed carve-out (`#[global_allocator]` ready)
//! - Power-state transitions through the reset controller
//! - Chip revision probe (restricted-revision gate)
//! - Hardware re-init + boot-magic latch before payload hand-off
//! - Stack pivot for the entry routine
//!
//! # What This Crate Does NOT Do
//!
//! - Storage driver programming (behind `cinder_core::storage`)
//! - Display/framebuffer output (behind the bootloader's console trait)
//! - Key derivation

#![no_std]
#![allow(dead_code)]
#![allow(clippy::new_without_default)]

pub mod fuse;
pub mod heap;
pub mod mmio;
pub mod platform;
pub mod power;
pub mod reinit;
pub mod stack;
pub mod timer;

// ═══════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use fuse::is_restricted_revision;
pub use heap::{heap_stats, init_heap_with_region, is_heap_initialized, HeapAllocator};
pub use platform::hw_init;
pub use power::PmcControl;
pub use reinit::SocReinit;
pub use stack::pivot_stack;
pub use timer::{msleep, ticks_us, usleep};
