// Text-mode UI: console surface, button input, and the action menu.

pub mod input;
pub mod menu;
pub mod render;

use input::InputSource;
use menu::EntryTag;
use render::{TextConsole, COLOR_ORANGE, COLOR_RED};

/// Context handed to the menu engine and through it to entry callbacks.
///
/// The engine pulls the console and button source out of the context
/// between callback invocations, so a single `&mut` context serves both
/// the engine and the callbacks.
pub trait MenuSurface {
    fn console(&mut self) -> &mut dyn TextConsole;
    fn input(&mut self) -> &mut dyn InputSource;

    /// Whether the tagged entry has been retired for this session.
    fn entry_greyed(&self, _tag: EntryTag) -> bool {
        false
    }
}

/// Prompt for a button press and block until one arrives.
pub fn press_to_return(con: &mut dyn TextConsole, input: &mut dyn InputSource, y: usize) {
    con.put_str_at(0, y, "Press a button to return to the menu.", COLOR_ORANGE);
    input.wait();
}

/// Report a failure and hold the screen until the operator acknowledges.
pub fn report_failure(
    con: &mut dyn TextConsole,
    input: &mut dyn InputSource,
    y: usize,
    message: &str,
    tag: &'static str,
) {
    cinder_core::logger::log(tag);
    con.put_str_at(0, y, message, COLOR_RED);
    press_to_return(con, input, y + 2);
}
