//! Button input.

/// The three physical buttons this stage reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Select,
}

/// Blocking button source.
///
/// `wait` parks until the operator presses something; it is the only
/// suspension point in the whole stage and has no timeout.
pub trait InputSource {
    fn wait(&mut self) -> Button;
}
