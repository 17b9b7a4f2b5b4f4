//! Chainload protocol.
//!
//! Reads a payload image off storage into a hardware-stable staging
//! region, patches the bootstrap stub's relocation header, re-inits the
//! hardware the payload expects to own, and jumps. The jump never
//! returns; every failure before it leaves storage demounted and hands
//! control back to the menu.
//!
//! Two payload classes, split by file size: native images stage at the
//! fixed external-payload address, alternate-firmware images stage so
//! their end meets a fixed upper bound. The alternate class is refused
//! outright on the restricted hardware revision.

mod reloc;

pub use reloc::{
    align16, RelocationHeader, BOOTSTRAP_BASE, BOOTSTRAP_STUB_SIZE, RELOC_META_OFF,
    RELOC_STACK_TOP,
};

use cinder_core::log_info;
use cinder_core::storage::StorageError;
use core::convert::Infallible;

use crate::session::Session;
use crate::tui::render::COLOR_RED;

/// Entry address for staged payloads; the hand-off jumps here.
pub const EXT_PAYLOAD_ADDR: u32 = 0xC000_0000;

/// Upper bound alternate-firmware images are packed against.
pub const ALT_FW_END_ADDR: u32 = 0xD000_0000;

/// Images at or above this size are the alternate-firmware class.
pub const ALT_FW_SIZE_FLOOR: u32 = 0x3_0000;

/// Size of the alternate-firmware bootblock relocated beside the stub.
pub const ALT_FW_BOOTBLOCK_SIZE: u32 = 0x7000;

/// Offset of the ASCII version tag inside an alternate-firmware image.
pub const ALT_FW_TAG_OFF: usize = 0x41;

/// Register arming the auxiliary DRAM window, and the word it expects.
pub const DRAM_WINDOW_EN_ADDR: u32 = 0x4003_E000;
pub const DRAM_WINDOW_MAGIC: u32 = 0x4452_414D; // "DRAM"

/// Some cards reject a fast power cycle; minimum settle before hand-off.
const STORAGE_SETTLE_MS: u32 = 100;

/// Why a chainload was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainloadError {
    /// Volume would not mount
    StorageUnavailable,
    /// No payload at the requested path
    FileNotFound,
    /// Image read failed or returned short
    ReadFailure,
    /// Alternate-firmware payload on the restricted revision
    UnsupportedOnHardwareRevision,
}

impl ChainloadError {
    /// Get a human-readable description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StorageUnavailable => "No storage.",
            Self::FileNotFound => "Payload file is missing!",
            Self::ReadFailure => "Failed to read payload.",
            Self::UnsupportedOnHardwareRevision => {
                "Alternate firmware is not supported on this hardware revision!"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadClass {
    Native,
    AltFirmware,
}

/// Where an image goes and how much the stub relocates, decided purely
/// from the image size and the hardware revision. No memory is touched
/// until a plan exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPlan {
    pub class: PayloadClass,
    pub dest: u32,
    pub reloc_size: u32,
}

impl LoadPlan {
    pub fn for_size(size: u32, restricted_hw: bool) -> Result<Self, ChainloadError> {
        if size < ALT_FW_SIZE_FLOOR {
            return Ok(Self {
                class: PayloadClass::Native,
                dest: EXT_PAYLOAD_ADDR,
                reloc_size: align16(size),
            });
        }

        if restricted_hw {
            return Err(ChainloadError::UnsupportedOnHardwareRevision);
        }

        Ok(Self {
            class: PayloadClass::AltFirmware,
            dest: ALT_FW_END_ADDR - size,
            reloc_size: ALT_FW_BOOTBLOCK_SIZE,
        })
    }
}

/// Boot word for a native payload: the image's last word, byte-order
/// reversed.
pub fn native_boot_magic(image: &[u8]) -> u32 {
    if image.len() < 4 {
        return 0;
    }
    let tail = &image[image.len() - 4..];
    u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]).swap_bytes()
}

/// Boot word for an alternate-firmware payload: the four bytes ending
/// at the NUL terminator of the ASCII tag at [`ALT_FW_TAG_OFF`].
pub fn alt_fw_boot_magic(image: &[u8]) -> u32 {
    if image.len() <= ALT_FW_TAG_OFF {
        return 0;
    }
    let tag = &image[ALT_FW_TAG_OFF..];
    let len = tag.iter().position(|&b| b == 0).unwrap_or(tag.len());
    if len < 4 {
        return 0;
    }
    let word = &tag[len - 4..len];
    u32::from_le_bytes([word[0], word[1], word[2], word[3]])
}

/// Load the payload at `path` and transfer control to it.
///
/// Success is uninhabited: if the image is staged, the jump happens and
/// this call never returns. Every error path reports to the console,
/// leaves storage demounted, and performs no hand-off.
pub fn chainload(
    ctx: &mut Session,
    path: &str,
    clear_screen: bool,
) -> Result<Infallible, ChainloadError> {
    if clear_screen {
        ctx.console.clear();
    }

    if ctx.storage.mount().is_err() {
        log_info!("chainload: storage unavailable");
        ctx.console.put_str_at(0, 0, ChainloadError::StorageUnavailable.as_str(), COLOR_RED);
        return Err(ChainloadError::StorageUnavailable);
    }

    let handle = match ctx.storage.open(path) {
        Ok(h) => h,
        Err(err) => {
            log_info!("chainload: payload missing");
            ctx.console.put_str_at(0, 0, ChainloadError::FileNotFound.as_str(), COLOR_RED);
            ctx.console.put_str_at(0, 1, path, COLOR_RED);
            ctx.storage.unmount();
            return Err(match err {
                StorageError::Unavailable => ChainloadError::StorageUnavailable,
                _ => ChainloadError::FileNotFound,
            });
        }
    };

    let size = ctx.storage.size(handle);
    let plan = match LoadPlan::for_size(size, ctx.cfg.restricted_hw) {
        Ok(plan) => plan,
        Err(err) => {
            log_info!("chainload: class refused on this revision");
            ctx.console.put_str_at(0, 0, err.as_str(), COLOR_RED);
            ctx.storage.close(handle);
            ctx.storage.unmount();
            return Err(err);
        }
    };

    // One-pass read straight into the staging destination.
    let image = unsafe {
        core::slice::from_raw_parts_mut(plan.dest as usize as *mut u8, size as usize)
    };
    if ctx.storage.read(handle, image).is_err() {
        log_info!("chainload: read failed");
        ctx.console.put_str_at(0, 0, ChainloadError::ReadFailure.as_str(), COLOR_RED);
        ctx.storage.close(handle);
        ctx.storage.unmount();
        return Err(ChainloadError::ReadFailure);
    }

    ctx.storage.close(handle);
    ctx.storage.unmount();

    // Point of no return from here down: storage is released and the
    // resident stub is about to describe the new payload.
    let stub = unsafe {
        core::slice::from_raw_parts_mut(BOOTSTRAP_BASE as usize as *mut u8, BOOTSTRAP_STUB_SIZE)
    };
    RelocationHeader::for_destination(plan.dest, plan.reloc_size).patch(stub);

    match plan.class {
        PayloadClass::Native => {
            ctx.hw.reinit(false, native_boot_magic(image));
        }
        PayloadClass::AltFirmware => {
            unsafe {
                // Stage the bootblock beside the stub and arm the
                // auxiliary DRAM window the firmware boots through.
                let reloc_area =
                    (EXT_PAYLOAD_ADDR + align16(BOOTSTRAP_STUB_SIZE as u32)) as usize as *mut u8;
                core::ptr::copy_nonoverlapping(
                    plan.dest as usize as *const u8,
                    reloc_area,
                    ALT_FW_BOOTBLOCK_SIZE as usize,
                );
                cinder_hwinit::mmio::write32(DRAM_WINDOW_EN_ADDR, DRAM_WINDOW_MAGIC);
            }
            ctx.hw.reinit(true, alt_fw_boot_magic(image));
        }
    }

    cinder_hwinit::timer::msleep(STORAGE_SETTLE_MS);

    unsafe { enter_payload() }
}

// Jump to the staged payload. This does not return!
unsafe fn enter_payload() -> ! {
    let entry: extern "C" fn() -> ! =
        core::mem::transmute(EXT_PAYLOAD_ADDR as usize);
    entry()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_image_stages_at_external_payload_addr() {
        let plan = LoadPlan::for_size(0x1000, false).unwrap();
        assert_eq!(plan.class, PayloadClass::Native);
        assert_eq!(plan.dest, EXT_PAYLOAD_ADDR);
        assert_eq!(plan.reloc_size, 0x1000);
    }

    #[test]
    fn test_native_header_fields() {
        let plan = LoadPlan::for_size(0x1000, false).unwrap();
        let header = RelocationHeader::for_destination(plan.dest, plan.reloc_size);
        assert_eq!(header.load_end, EXT_PAYLOAD_ADDR + 0x1000);
        assert_eq!(header.entry_point, EXT_PAYLOAD_ADDR);
    }

    #[test]
    fn test_large_image_packs_against_end_bound() {
        let plan = LoadPlan::for_size(0x40000, false).unwrap();
        assert_eq!(plan.class, PayloadClass::AltFirmware);
        assert_eq!(plan.dest, ALT_FW_END_ADDR - 0x40000);
        assert_eq!(plan.reloc_size, ALT_FW_BOOTBLOCK_SIZE);
    }

    #[test]
    fn test_large_image_refused_on_restricted_revision() {
        assert_eq!(
            LoadPlan::for_size(0x40000, true),
            Err(ChainloadError::UnsupportedOnHardwareRevision)
        );
    }

    #[test]
    fn test_threshold_is_exclusive_below() {
        assert_eq!(
            LoadPlan::for_size(ALT_FW_SIZE_FLOOR - 1, true).unwrap().class,
            PayloadClass::Native
        );
        assert_eq!(
            LoadPlan::for_size(ALT_FW_SIZE_FLOOR, false).unwrap().class,
            PayloadClass::AltFirmware
        );
    }

    #[test]
    fn test_native_boot_magic_reverses_byte_order() {
        let mut image = [0u8; 0x20];
        image[0x1C..].copy_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(native_boot_magic(&image), 0xAABB_CCDD);
        assert_eq!(native_boot_magic(&[0u8; 2]), 0);
    }

    #[test]
    fn test_alt_fw_boot_magic_reads_tag_tail() {
        let mut image = [0u8; 0x100];
        let tag = b"2024.07.1\0";
        image[ALT_FW_TAG_OFF..ALT_FW_TAG_OFF + tag.len()].copy_from_slice(tag);
        assert_eq!(alt_fw_boot_magic(&image), u32::from_le_bytes(*b"07.1"));
    }

    #[test]
    fn test_alt_fw_boot_magic_handles_short_tags() {
        let mut image = [0u8; 0x100];
        image[ALT_FW_TAG_OFF..ALT_FW_TAG_OFF + 3].copy_from_slice(b"ab\0");
        assert_eq!(alt_fw_boot_magic(&image), 0);
        assert_eq!(alt_fw_boot_magic(&[0u8; 8]), 0);
    }
}
