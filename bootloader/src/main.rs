//! Cinder boot stage - chainloading action menu
//!
//! Second-stage entry: bring the hardware up, move to a real stack,
//! carve out the heap, and take the default boot action. The action
//! menu (key dumps, payload browser, power transitions) is reached when
//! the previous stage's configuration asks for it; the default path
//! reboots straight back out through the fuse-bypass transition.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]
#![allow(dead_code)]
#![allow(clippy::new_without_default)]

extern crate alloc;

mod chainload;
mod dispatch;
mod payloads;
mod session;
mod tui;

use cinder_core::power::{PowerControl, PowerState};
use cinder_hwinit as hwinit;
use cinder_hwinit::power::PmcControl;

// Execution stack for this stage; the stack we enter on is too small
// for the menu and chainload paths.
const STAGE_STACK_TOP: u32 = 0x8310_0000;

// Heap carve-out between the firmware configuration area below and the
// payload staging region above.
const STAGE_HEAP_START: u32 = 0x9000_0000;
const STAGE_HEAP_SIZE: usize = 16 * 1024 * 1024;

#[cfg(target_os = "none")]
#[global_allocator]
static ALLOCATOR: hwinit::heap::HeapAllocator = hwinit::heap::HeapAllocator::new();

const VERSION_MAGIC: u32 = u32::from_le_bytes(*b"CNDR");

const VER_MAJOR: u32 = 0;
const VER_MINOR: u32 = 9;
const VER_PATCH: u32 = 0;

/// Version record the previous stage locates by magic.
#[repr(C)]
struct VersionMeta {
    magic: u32,
    version: u32,
    rsvd0: u32,
    rsvd1: u32,
}

#[cfg_attr(target_os = "none", link_section = ".version")]
#[no_mangle]
static VERSION_META: VersionMeta = VersionMeta {
    magic: VERSION_MAGIC,
    version: (VER_MAJOR + 0x30) | ((VER_MINOR + 0x30) << 8) | ((VER_PATCH + 0x30) << 16),
    rsvd0: 0,
    rsvd1: 0,
};

/// Boot configuration block a previous stage may fill in before
/// entering us; zero when booted bare.
#[repr(C)]
struct BootCfg {
    boot_cfg: u8,
    autoboot: u8,
    autoboot_list: u8,
    extra_cfg: u8,
    xt_str: [u8; 128],
}

#[cfg_attr(target_os = "none", link_section = ".boot_cfg")]
#[no_mangle]
static mut BOOT_CFG: BootCfg = BootCfg {
    boot_cfg: 0,
    autoboot: 0,
    autoboot_list: 0,
    extra_cfg: 0,
    xt_str: [0; 128],
};

/// Stage entry.
#[no_mangle]
pub extern "C" fn bl_main() -> ! {
    // Initial hardware configuration. Compatible with consecutive
    // reruns without a reset.
    unsafe {
        hwinit::hw_init();

        // Pivot the stack so we have enough space.
        hwinit::pivot_stack(STAGE_STACK_TOP);

        let _ = hwinit::init_heap_with_region(STAGE_HEAP_START, STAGE_HEAP_SIZE);
    }

    // Default boot action: straight back out, skipping fuse checks.
    PmcControl::new().set_power_state(PowerState::RebootBypassFuses)
}

#[cfg(target_os = "none")]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    cinder_core::log_info!("panic: stage parked");
    loop {
        core::hint::spin_loop();
    }
}

// Hosted builds only exist for the test suite; the stage itself always
// runs bare-metal.
#[cfg(not(target_os = "none"))]
fn main() {}
