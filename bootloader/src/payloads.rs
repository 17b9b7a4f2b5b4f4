//! Payload directory builder.
//!
//! Turns the payload directory plus a couple of well-known auxiliary
//! images into a selection menu, one entry per discovered candidate.
//! The menu is rebuilt on every visit; the card may have changed
//! between visits, so nothing is cached.

use alloc::string::String;
use alloc::vec::Vec;

use cinder_core::log_info;
use cinder_core::path;
use cinder_core::storage::StorageBridge;

use crate::chainload;
use crate::session::Session;
use crate::tui;
use crate::tui::menu::{Menu, MenuArg, MenuEntry, MENU_CAPACITY};
use crate::tui::render::MENU_PALETTE;

/// Directory enumerated for payload candidates.
pub const PAYLOAD_DIR: &str = "sd:/bootloader/payloads";

/// Well-known auxiliary boot images, probed individually and listed
/// ahead of the directory contents, in this priority order.
const FIXED_IMAGES: [&str; 2] = ["sd:/atmosphere/reboot_payload.bin", "sd:/ReiNX.bin"];

/// A discovered payload: display name and full logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadCandidate {
    pub name: String,
    pub path: String,
}

/// Gather candidates: fixed images first, then the directory in
/// enumeration order. The combined count is capped at the menu
/// capacity; anything beyond it is silently dropped.
pub fn collect_candidates(
    storage: &mut dyn StorageBridge,
    dir: &str,
) -> Vec<PayloadCandidate> {
    let mut found = Vec::new();

    for image in FIXED_IMAGES {
        if storage.exists(image) {
            found.push(PayloadCandidate {
                name: String::from(path::leaf_name(image)),
                path: String::from(image),
            });
        }
    }

    if let Ok(names) = storage.list(dir) {
        for name in names {
            let full = path::join(dir, &name);
            found.push(PayloadCandidate { name, path: full });
        }
    }

    found.truncate(MENU_CAPACITY);
    found
}

fn launch_selected(ctx: &mut Session, arg: &MenuArg) {
    if let MenuArg::Path(selected) = arg {
        let selected = selected.clone();
        if chainload::chainload(ctx, &selected, true).is_err() {
            tui::report_failure(
                &mut *ctx.console,
                &mut *ctx.buttons,
                3,
                "Failed to launch payload.",
                "payloads: launch failed",
            );
        }
    }
}

/// Synthesize the selection menu for a candidate list.
///
/// Zero candidates surface an informational notice instead of an empty
/// list; the menu itself always carries at least Back.
pub fn payload_menu_from(candidates: Vec<PayloadCandidate>) -> Menu<Session> {
    let mut color_idx = 0;
    let mut next_color = || {
        let color = MENU_PALETTE[color_idx % MENU_PALETTE.len()];
        color_idx += 1;
        color
    };

    let mut menu = Menu::new(Some("Choose a file to launch"));
    menu.push(MenuEntry::back(next_color()));
    menu.push(MenuEntry::separator());

    if candidates.is_empty() {
        log_info!("payloads: none found");
        menu.push(MenuEntry::caption("No payloads found.", next_color()));
        return menu;
    }

    for candidate in candidates {
        menu.push(MenuEntry::action_with_arg(
            &candidate.name,
            next_color(),
            Some(launch_selected),
            MenuArg::Path(candidate.path),
        ));
    }
    menu
}

/// Build the payload menu for `dir`, mounting storage first.
pub fn build_payload_menu(ctx: &mut Session, dir: &str) -> Menu<Session> {
    if ctx.storage.mount().is_err() {
        tui::report_failure(
            &mut *ctx.console,
            &mut *ctx.buttons,
            0,
            "No storage.",
            "payloads: no storage",
        );
        let mut menu = Menu::new(Some("Choose a file to launch"));
        menu.push(MenuEntry::back(MENU_PALETTE[0]));
        return menu;
    }

    let candidates = collect_candidates(&mut *ctx.storage, dir);
    payload_menu_from(candidates)
}

/// The payload browser action: build, interact, release storage, and
/// hold until the operator acknowledges.
pub fn browse_payloads(ctx: &mut Session) {
    let mut menu = build_payload_menu(ctx, PAYLOAD_DIR);
    let _ = menu.run(ctx);
    ctx.storage.unmount();
    tui::press_to_return(&mut *ctx.console, &mut *ctx.buttons, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::session_with;
    use crate::session::SessionCfg;
    use crate::tui::input::Button;
    use crate::tui::menu::EntryKind;
    use cinder_core::storage::RamDisk;

    fn populated_disk() -> RamDisk {
        let mut disk = RamDisk::new();
        disk.insert("sd:/atmosphere/reboot_payload.bin", b"rp");
        disk.insert("sd:/ReiNX.bin", b"rx");
        disk.insert("sd:/bootloader/payloads/alpha.bin", b"a");
        disk.insert("sd:/bootloader/payloads/beta.bin", b"b");
        disk.mount().unwrap();
        disk
    }

    fn action_count(menu: &Menu<crate::session::Session>) -> usize {
        menu.entries()
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::ActionWithArg(..)))
            .count()
    }

    #[test]
    fn test_fixed_images_come_first_in_priority_order() {
        let mut disk = populated_disk();
        let found = collect_candidates(&mut disk, PAYLOAD_DIR);
        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["reboot_payload.bin", "ReiNX.bin", "alpha.bin", "beta.bin"]
        );
        assert_eq!(found[0].path, "sd:/atmosphere/reboot_payload.bin");
        assert_eq!(found[2].path, "sd:/bootloader/payloads/alpha.bin");
    }

    #[test]
    fn test_collection_is_idempotent() {
        let mut disk = populated_disk();
        let first = collect_candidates(&mut disk, PAYLOAD_DIR);
        let second = collect_candidates(&mut disk, PAYLOAD_DIR);
        assert_eq!(first, second);
    }

    #[test]
    fn test_candidates_capped_at_menu_capacity() {
        let mut disk = RamDisk::new();
        for i in 0..(MENU_CAPACITY + 9) {
            let path = alloc::format!("sd:/bootloader/payloads/file{:03}.bin", i);
            disk.insert(&path, b"x");
        }
        disk.mount().unwrap();

        let found = collect_candidates(&mut disk, PAYLOAD_DIR);
        assert_eq!(found.len(), MENU_CAPACITY);
    }

    #[test]
    fn test_menu_has_one_action_per_candidate_plus_fixed_rows() {
        let mut disk = populated_disk();
        let found = collect_candidates(&mut disk, PAYLOAD_DIR);
        let count = found.len();
        let menu = payload_menu_from(found);

        // Back + separator + one action per candidate.
        assert_eq!(menu.len(), count + 2);
        assert_eq!(action_count(&menu), count);
        assert!(matches!(menu.entries()[0].kind, EntryKind::Back));
        assert!(matches!(menu.entries()[1].kind, EntryKind::SectionBreak));
    }

    #[test]
    fn test_zero_candidates_surface_a_notice() {
        let menu = payload_menu_from(Vec::new());
        assert_eq!(action_count(&menu), 0);
        assert!(menu
            .entries()
            .iter()
            .any(|e| matches!(e.kind, EntryKind::Caption) && e.label == "No payloads found."));
    }

    #[test]
    fn test_missing_storage_yields_back_only_menu() {
        let mut disk = RamDisk::new();
        disk.fail_mount = true;

        // One press to acknowledge the failure report.
        let (mut session, probe) =
            session_with(SessionCfg::default(), disk, &[Button::Select], 0);
        let menu = build_payload_menu(&mut session, PAYLOAD_DIR);

        assert_eq!(menu.len(), 1);
        assert!(matches!(menu.entries()[0].kind, EntryKind::Back));
        assert!(probe
            .lines
            .borrow()
            .iter()
            .any(|(_, _, s, _)| s == "No storage."));
    }
}
