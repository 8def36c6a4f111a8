//! A terminal busy indicator: an animated glyph and a message on one line,
//! drawn from a background thread while the caller keeps working, ending in
//! a success or error line.

mod error;
mod interrupt;
pub mod platform;
pub mod render;
mod spinner;

pub use error::SpinnerError;
pub use interrupt::ABORT_EXIT_CODE;
pub use render::{LineRenderer, TerminalRenderer};
pub use spinner::{NOT_RUNNING_NOTE, Outcome, Spinner, SpinnerOptions};
