//! Top-level dispatcher.
//!
//! Wires the root menu: key extraction in its variants, the payload
//! browser, the reboot-to-bootstrap shortcut, and the power
//! transitions. A successful partial-key dump retires the other dump
//! actions for the rest of the session, since the keyslots it walks are
//! gone until a cold boot.

use cinder_core::keys::invalidates_keyslots;
use cinder_core::log_info;
use cinder_core::power::PowerState;

use crate::chainload;
use crate::payloads;
use crate::session::Session;
use crate::tui;
use crate::tui::menu::{EntryTag, Menu, MenuArg, MenuEntry};
use crate::tui::render::MENU_PALETTE;

pub const TAG_DUMP_SYSTEM: EntryTag = EntryTag(0);
pub const TAG_DUMP_EMULATED: EntryTag = EntryTag(1);
pub const TAG_PARTIALS_MENU: EntryTag = EntryTag(2);
pub const TAG_PARTIALS_TRIGGER: EntryTag = EntryTag(3);

/// Fixed image the bootstrap shortcut chain-loads.
pub const UPDATE_IMAGE: &str = "bootloader/update.bin";

fn dump_system(ctx: &mut Session) {
    ctx.cfg.emu_force_disable = true;
    ctx.cfg.emu_enabled = false;
    ctx.keys.dump_keys(false);
}

fn dump_emulated(ctx: &mut Session) {
    if ctx.cfg.emu_force_disable {
        return;
    }
    ctx.cfg.emu_enabled = true;
    ctx.keys.dump_keys(true);
}

fn dump_amiibo(ctx: &mut Session) {
    ctx.keys.derive_amiibo_keys();
}

fn dump_partial_keys(ctx: &mut Session) {
    if !ctx.cfg.restricted_hw {
        return;
    }

    let status = ctx.keys.save_partial_keys(0, 16, false);
    if invalidates_keyslots(status) {
        // The walked keyslots are unusable until a cold boot; retire
        // every action that would read them.
        log_info!("partials: keyslots retired");
        ctx.grey_out(TAG_DUMP_SYSTEM);
        ctx.grey_out(TAG_DUMP_EMULATED);
        ctx.grey_out(TAG_PARTIALS_MENU);
        ctx.grey_out(TAG_PARTIALS_TRIGGER);
    }

    tui::press_to_return(&mut *ctx.console, &mut *ctx.buttons, 20);
}

fn reboot_to_bootstrap(ctx: &mut Session) {
    if ctx.storage.mount().is_err() {
        return;
    }
    if ctx.storage.exists(UPDATE_IMAGE) {
        // Only returns on failure; the browser flow reports, we just
        // fall back to the menu.
        let _ = chainload::chainload(ctx, UPDATE_IMAGE, false);
    }
    ctx.storage.unmount();
}

fn set_power(ctx: &mut Session, arg: &MenuArg) {
    if let MenuArg::Power(state) = arg {
        ctx.power.set_power_state(*state)
    }
}

fn partials_menu() -> Menu<Session> {
    let c = MENU_PALETTE;
    let mut m = Menu::new(None);
    m.push(MenuEntry::back(c[0]));
    m.push(MenuEntry::separator());
    m.push(MenuEntry::caption("This dumps the result of writing zeros", c[1]));
    m.push(MenuEntry::caption("over consecutive 32-bit parts of each", c[1]));
    m.push(MenuEntry::caption("keyslot; a computer can brute-force the", c[1]));
    m.push(MenuEntry::caption("results quickly to recover keys from", c[1]));
    m.push(MenuEntry::caption("keyslots the hardware refuses to read.", c[1]));
    m.push(MenuEntry::separator());
    m.push(MenuEntry::caption("This covers the device KEK and BEK", c[2]));
    m.push(MenuEntry::caption("as well as the unique SBK.", c[2]));
    m.push(MenuEntry::separator());
    m.push(MenuEntry::caption("Most users have no need for these;", c[3]));
    m.push(MenuEntry::caption("they are kept for archival purposes.", c[3]));
    m.push(MenuEntry::separator());
    m.push(MenuEntry::caption("Warning: this wipes the keyslots!", c[4]));
    m.push(MenuEntry::caption("The console must be fully restarted!", c[4]));
    m.push(MenuEntry::caption("The modchip must run again to fix them!", c[4]));
    m.push(MenuEntry::caption("---------------", c[5]));
    m.push(
        MenuEntry::action("Dump partial keys", c[0], dump_partial_keys)
            .with_tag(TAG_PARTIALS_TRIGGER),
    );
    m
}

/// The root menu. Rebuilt per visit; retirement state lives in the
/// session and is re-applied by the engine.
pub fn build_top_menu() -> Menu<Session> {
    let c = MENU_PALETTE;
    let mut m = Menu::new(None);
    m.push(
        MenuEntry::action("Dump from system storage", c[0], dump_system)
            .with_tag(TAG_DUMP_SYSTEM),
    );
    m.push(
        MenuEntry::action("Dump from emulated storage", c[1], dump_emulated)
            .with_tag(TAG_DUMP_EMULATED),
    );
    m.push(MenuEntry::caption("---------------", c[2]));
    m.push(MenuEntry::action("Dump amiibo keys", c[3], dump_amiibo));
    m.push(
        MenuEntry::submenu(
            "Dump partial keys (requires reboot)",
            c[4],
            partials_menu(),
        )
        .with_tag(TAG_PARTIALS_MENU),
    );
    m.push(MenuEntry::caption("---------------", c[5]));
    m.push(MenuEntry::action("Payloads...", c[0], payloads::browse_payloads));
    m.push(MenuEntry::action("Reboot to bootstrap", c[1], reboot_to_bootstrap));
    m.push(MenuEntry::caption("---------------", c[2]));
    m.push(MenuEntry::action_with_arg(
        "Reboot",
        c[3],
        Some(set_power),
        MenuArg::Power(PowerState::Reboot),
    ));
    m.push(MenuEntry::action_with_arg(
        "Reboot (firmware)",
        c[4],
        Some(set_power),
        MenuArg::Power(PowerState::RebootBypassFuses),
    ));
    m.push(MenuEntry::action_with_arg(
        "Reboot (recovery)",
        c[5],
        Some(set_power),
        MenuArg::Power(PowerState::RebootRecovery),
    ));
    m.push(MenuEntry::action_with_arg(
        "Power off",
        c[0],
        Some(set_power),
        MenuArg::Power(PowerState::PowerOff),
    ));
    m
}

/// Interact with the root menu until a power transition or chainload
/// leaves the stage. The root has no Back entry, so this never returns
/// through the menu itself.
pub fn run_top_menu(ctx: &mut Session) {
    loop {
        let _ = build_top_menu().run(ctx);
    }
}
