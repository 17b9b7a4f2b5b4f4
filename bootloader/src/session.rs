//! Session state.
//!
//! One owned struct carries everything a menu callback may touch: the
//! configuration flags, the one-way grey-out mask, and the collaborator
//! implementations. There is a single thread of control, so plain owned
//! state is enough; a concurrent port would put one mutex around the
//! whole session.

use alloc::boxed::Box;

use cinder_core::keys::KeyVault;
use cinder_core::power::PowerControl;
use cinder_core::reinit::HwReinit;
use cinder_core::storage::StorageBridge;

use crate::tui::input::InputSource;
use crate::tui::menu::EntryTag;
use crate::tui::render::TextConsole;
use crate::tui::MenuSurface;

/// Process-wide configuration flags, mutated only from callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCfg {
    /// Running on the restricted hardware revision
    pub restricted_hw: bool,
    /// Emulated storage permanently disabled for this session
    pub emu_force_disable: bool,
    /// Emulated storage selected as the key source
    pub emu_enabled: bool,
}

pub struct Session {
    pub cfg: SessionCfg,
    pub storage: Box<dyn StorageBridge>,
    pub keys: Box<dyn KeyVault>,
    pub power: Box<dyn PowerControl>,
    pub hw: Box<dyn HwReinit>,
    pub console: Box<dyn TextConsole>,
    pub buttons: Box<dyn InputSource>,
    greyed: u8,
}

impl Session {
    pub fn new(
        cfg: SessionCfg,
        storage: Box<dyn StorageBridge>,
        keys: Box<dyn KeyVault>,
        power: Box<dyn PowerControl>,
        hw: Box<dyn HwReinit>,
        console: Box<dyn TextConsole>,
        buttons: Box<dyn InputSource>,
    ) -> Self {
        Self {
            cfg,
            storage,
            keys,
            power,
            hw,
            console,
            buttons,
            greyed: 0,
        }
    }

    /// Session over the real hardware collaborators. Storage, keys,
    /// console and buttons come from the platform integration; power,
    /// re-init and the revision flag are wired here.
    pub fn with_hardware(
        storage: Box<dyn StorageBridge>,
        keys: Box<dyn KeyVault>,
        console: Box<dyn TextConsole>,
        buttons: Box<dyn InputSource>,
    ) -> Self {
        Self::new(
            SessionCfg {
                restricted_hw: cinder_hwinit::is_restricted_revision(),
                ..SessionCfg::default()
            },
            storage,
            keys,
            Box::new(cinder_hwinit::PmcControl::new()),
            Box::new(cinder_hwinit::SocReinit::new()),
            console,
            buttons,
        )
    }

    /// Retire the tagged entry for the rest of the session. There is no
    /// way back; the mask only ever gains bits.
    pub fn grey_out(&mut self, tag: EntryTag) {
        debug_assert!(tag.0 < 8);
        self.greyed |= 1 << tag.0;
    }

    pub fn is_greyed(&self, tag: EntryTag) -> bool {
        self.greyed & (1 << tag.0) != 0
    }
}

impl MenuSurface for Session {
    fn console(&mut self) -> &mut dyn TextConsole {
        &mut *self.console
    }

    fn input(&mut self) -> &mut dyn InputSource {
        &mut *self.buttons
    }

    fn entry_greyed(&self, tag: EntryTag) -> bool {
        self.is_greyed(tag)
    }
}

#[cfg(test)]
pub mod testing {
    //! Collaborator doubles shared by the crate's test modules.

    use super::*;
    use crate::tui::input::Button;
    use crate::tui::render::Color;
    use alloc::string::String;
    use alloc::vec::Vec;
    use cinder_core::storage::RamDisk;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// What the key-vault double was asked to do.
    #[derive(Default)]
    pub struct KeyVaultLog {
        pub dumps: Vec<bool>,
        pub amiibo_derivations: usize,
        pub partial_requests: Vec<(u32, u32, bool)>,
    }

    pub struct MockKeys {
        pub log: Rc<RefCell<KeyVaultLog>>,
        pub partial_status: i32,
    }

    impl KeyVault for MockKeys {
        fn dump_keys(&mut self, use_emulated: bool) {
            self.log.borrow_mut().dumps.push(use_emulated);
        }

        fn derive_amiibo_keys(&mut self) {
            self.log.borrow_mut().amiibo_derivations += 1;
        }

        fn save_partial_keys(&mut self, slot_start: u32, count: u32, keep_slots: bool) -> i32 {
            self.log
                .borrow_mut()
                .partial_requests
                .push((slot_start, count, keep_slots));
            self.partial_status
        }
    }

    pub struct MockPower;

    impl PowerControl for MockPower {
        fn set_power_state(&mut self, state: cinder_core::power::PowerState) -> ! {
            panic!("power transition in test: {:?}", state);
        }
    }

    pub struct MockReinit;

    impl HwReinit for MockReinit {
        fn reinit(&mut self, _alt_firmware: bool, _magic: u32) {}
    }

    pub struct RecordingConsole {
        pub lines: Rc<RefCell<Vec<(usize, usize, String, Color)>>>,
    }

    impl TextConsole for RecordingConsole {
        fn clear(&mut self) {}

        fn put_str_at(&mut self, x: usize, y: usize, s: &str, color: Color) {
            self.lines.borrow_mut().push((x, y, String::from(s), color));
        }

        fn rows(&self) -> usize {
            30
        }

        fn cols(&self) -> usize {
            80
        }
    }

    pub struct ScriptButtons {
        pub script: Vec<Button>,
        pub pos: usize,
    }

    impl InputSource for ScriptButtons {
        fn wait(&mut self) -> Button {
            let button = self.script[self.pos];
            self.pos += 1;
            button
        }
    }

    /// Everything a test needs to poke at a session afterwards.
    pub struct SessionProbe {
        pub keys: Rc<RefCell<KeyVaultLog>>,
        pub lines: Rc<RefCell<Vec<(usize, usize, String, Color)>>>,
    }

    pub fn session_with(
        cfg: SessionCfg,
        disk: RamDisk,
        buttons: &[Button],
        partial_status: i32,
    ) -> (Session, SessionProbe) {
        let keys_log = Rc::new(RefCell::new(KeyVaultLog::default()));
        let lines = Rc::new(RefCell::new(Vec::new()));

        let session = Session::new(
            cfg,
            Box::new(disk),
            Box::new(MockKeys {
                log: keys_log.clone(),
                partial_status,
            }),
            Box::new(MockPower),
            Box::new(MockReinit),
            Box::new(RecordingConsole {
                lines: lines.clone(),
            }),
            Box::new(ScriptButtons {
                script: Vec::from(buttons),
                pos: 0,
            }),
        );

        (
            session,
            SessionProbe {
                keys: keys_log,
                lines,
            },
        )
    }

    #[test]
    fn test_grey_out_is_one_way() {
        let (mut session, _probe) =
            session_with(SessionCfg::default(), RamDisk::new(), &[], 0);
        let tag = EntryTag(2);
        assert!(!session.is_greyed(tag));
        session.grey_out(tag);
        assert!(session.is_greyed(tag));
        assert!(!session.is_greyed(EntryTag(3)));
    }
}
