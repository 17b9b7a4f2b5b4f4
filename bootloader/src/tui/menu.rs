//! Action menu engine.
//!
//! A menu is an ordered list of entries walked with Up/Down and
//! activated with Select. Entries dispatch to plain function pointers,
//! optionally with a stored argument; an argument entry without a
//! callback resolves to the argument itself, handed back to the caller
//! as [`SelectionOutcome::Value`]. Submenus nest by ownership.
//!
//! Cursor policy: the cursor clamps at both ends (no wrap-around) and
//! skips non-selectable rows; the viewport follows the selection one
//! row at a time.

use alloc::string::String;
use alloc::vec::Vec;

use cinder_core::power::PowerState;

use super::input::Button;
use super::render::{Color, COLOR_GREYED, COLOR_WHITE};
use super::MenuSurface;

/// Maximum number of payload entries a menu is built with.
pub const MENU_CAPACITY: usize = 61;

/// Total slots: capacity plus back, separator, and one fixed slot.
/// Pushes beyond this are silently dropped.
const MENU_SLOTS: usize = MENU_CAPACITY + 3;

/// Identity of an entry that can be retired (greyed out) at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTag(pub u8);

/// Stored argument for argument-carrying entries.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuArg {
    Power(PowerState),
    Path(String),
}

pub type ActionFn<Ctx> = fn(&mut Ctx);
pub type ActionArgFn<Ctx> = fn(&mut Ctx, &MenuArg);

pub enum EntryKind<Ctx> {
    /// Leave this menu
    Back,
    /// Blank spacer row, not selectable
    SectionBreak,
    /// Display-only row, not selectable
    Caption,
    /// Invoke a callback with no argument
    Action(ActionFn<Ctx>),
    /// Invoke a callback with the stored argument; with no callback the
    /// argument itself is the selection result
    ActionWithArg(Option<ActionArgFn<Ctx>>, MenuArg),
    /// Run a nested menu
    Submenu(Menu<Ctx>),
}

pub struct MenuEntry<Ctx> {
    pub label: String,
    pub color: Color,
    pub tag: Option<EntryTag>,
    pub kind: EntryKind<Ctx>,
}

impl<Ctx> MenuEntry<Ctx> {
    pub fn back(color: Color) -> Self {
        Self {
            label: String::from("Back"),
            color,
            tag: None,
            kind: EntryKind::Back,
        }
    }

    pub fn separator() -> Self {
        Self {
            label: String::new(),
            color: COLOR_WHITE,
            tag: None,
            kind: EntryKind::SectionBreak,
        }
    }

    pub fn caption(label: &str, color: Color) -> Self {
        Self {
            label: String::from(label),
            color,
            tag: None,
            kind: EntryKind::Caption,
        }
    }

    pub fn action(label: &str, color: Color, callback: ActionFn<Ctx>) -> Self {
        Self {
            label: String::from(label),
            color,
            tag: None,
            kind: EntryKind::Action(callback),
        }
    }

    pub fn action_with_arg(
        label: &str,
        color: Color,
        callback: Option<ActionArgFn<Ctx>>,
        arg: MenuArg,
    ) -> Self {
        Self {
            label: String::from(label),
            color,
            tag: None,
            kind: EntryKind::ActionWithArg(callback, arg),
        }
    }

    pub fn submenu(label: &str, color: Color, menu: Menu<Ctx>) -> Self {
        Self {
            label: String::from(label),
            color,
            tag: None,
            kind: EntryKind::Submenu(menu),
        }
    }

    pub fn with_tag(mut self, tag: EntryTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn selectable(&self) -> bool {
        !matches!(self.kind, EntryKind::SectionBreak | EntryKind::Caption)
    }

    /// Retire the entry: display-only, muted, callback gone. One-way.
    fn grey_out(&mut self) {
        self.kind = EntryKind::Caption;
        self.color = COLOR_GREYED;
    }
}

/// Outcome of a selection.
#[derive(Debug, PartialEq)]
pub enum SelectionOutcome {
    /// A callback ran; control stays in the menu
    Handled,
    /// Back was triggered
    Cancelled,
    /// A callback-less argument entry was selected
    Value(MenuArg),
}

pub struct Menu<Ctx> {
    title: Option<String>,
    entries: Vec<MenuEntry<Ctx>>,
    selected: usize,
    offset: usize,
}

impl<Ctx> Menu<Ctx> {
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title.map(String::from),
            entries: Vec::new(),
            selected: 0,
            offset: 0,
        }
    }

    /// Append an entry. Beyond the slot limit the entry is silently
    /// dropped; truncation is policy here, not an error.
    pub fn push(&mut self, entry: MenuEntry<Ctx>) {
        if self.entries.len() < MENU_SLOTS {
            self.entries.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MenuEntry<Ctx>] {
        &self.entries
    }

    fn first_selectable(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.selectable())
    }

    fn snap_to_selectable(&mut self) {
        let on_selectable = self
            .entries
            .get(self.selected)
            .map(|e| e.selectable())
            .unwrap_or(false);
        if !on_selectable {
            if let Some(idx) = self.first_selectable() {
                self.selected = idx;
            }
        }
    }

    fn move_up(&mut self) {
        let mut idx = self.selected;
        while idx > 0 {
            idx -= 1;
            if self.entries[idx].selectable() {
                self.selected = idx;
                return;
            }
        }
        // Nothing selectable above: clamp, cursor stays put.
    }

    fn move_down(&mut self) {
        let mut idx = self.selected;
        while idx + 1 < self.entries.len() {
            idx += 1;
            if self.entries[idx].selectable() {
                self.selected = idx;
                return;
            }
        }
        // Nothing selectable below: clamp, cursor stays put.
    }
}

impl<Ctx: MenuSurface> Menu<Ctx> {
    /// Interact until the operator backs out or picks a value.
    ///
    /// Holding the menu by `&mut` means a callback can never re-enter
    /// the menu it was invoked from; nested menus run by ownership.
    pub fn run(&mut self, ctx: &mut Ctx) -> SelectionOutcome {
        self.selected = 0;
        self.offset = 0;
        ctx.console().clear();

        loop {
            self.apply_grey_outs(ctx);
            self.snap_to_selectable();
            self.render(ctx);

            match ctx.input().wait() {
                Button::Up => self.move_up(),
                Button::Down => self.move_down(),
                Button::Select => match self.trigger(ctx) {
                    SelectionOutcome::Handled => ctx.console().clear(),
                    outcome => return outcome,
                },
            }
        }
    }

    /// Activate the entry under the cursor.
    pub(crate) fn trigger(&mut self, ctx: &mut Ctx) -> SelectionOutcome {
        self.trigger_at(self.selected, ctx)
    }

    pub(crate) fn trigger_at(&mut self, idx: usize, ctx: &mut Ctx) -> SelectionOutcome {
        let entry = match self.entries.get_mut(idx) {
            Some(e) => e,
            None => return SelectionOutcome::Handled,
        };

        match &mut entry.kind {
            EntryKind::Back => SelectionOutcome::Cancelled,
            EntryKind::SectionBreak | EntryKind::Caption => SelectionOutcome::Handled,
            EntryKind::Action(callback) => {
                let callback = *callback;
                callback(ctx);
                SelectionOutcome::Handled
            }
            EntryKind::ActionWithArg(Some(callback), arg) => {
                let callback = *callback;
                let arg = arg.clone();
                callback(ctx, &arg);
                SelectionOutcome::Handled
            }
            EntryKind::ActionWithArg(None, arg) => SelectionOutcome::Value(arg.clone()),
            EntryKind::Submenu(nested) => match nested.run(ctx) {
                // A cancelled submenu hands control back to its parent.
                SelectionOutcome::Cancelled => {
                    ctx.console().clear();
                    SelectionOutcome::Handled
                }
                outcome => outcome,
            },
        }
    }

    /// Convert retired entries in place. Consulted every iteration so a
    /// callback retiring entries of its own menu takes effect at once.
    pub(crate) fn apply_grey_outs(&mut self, ctx: &Ctx) {
        for entry in &mut self.entries {
            if let Some(tag) = entry.tag {
                if ctx.entry_greyed(tag) && entry.selectable() {
                    entry.grey_out();
                }
            }
        }
    }

    fn render(&mut self, ctx: &mut Ctx) {
        let rows = ctx.console().rows();
        let header = if self.title.is_some() { 2 } else { 0 };
        let visible = rows.saturating_sub(header).max(1);

        // The viewport follows the selection one row at a time.
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }

        let con = ctx.console();
        if let Some(title) = &self.title {
            con.put_str_at(1, 0, title, COLOR_WHITE);
        }

        let end = (self.offset + visible).min(self.entries.len());
        for i in self.offset..end {
            let entry = &self.entries[i];
            let y = header + (i - self.offset);
            if matches!(entry.kind, EntryKind::SectionBreak) {
                continue;
            }
            if i == self.selected && entry.selectable() {
                con.put_str_at(1, y, ">", COLOR_WHITE);
            }
            con.put_str_at(3, y, &entry.label, entry.color);
        }
    }
}
