//! Per-platform defaults for glyphs and status symbols.
//!
//! Windows consoles commonly lack braille and check-mark glyphs, so they get
//! plain ASCII. Everything here is a pure function of [`Platform`]; a spinner
//! copies the values at construction and never reads them again.

use std::io;
use std::time::Duration;

use crossterm::tty::IsTty;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_ABORT_MESSAGE: &str = "Aborted.";

const ASCII_GLYPHS: &[&str] = &["|", "/", "-", "\\"];
const BRAILLE_GLYPHS: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }
}

pub fn default_glyphs(platform: Platform) -> Vec<String> {
    let glyphs = match platform {
        Platform::Windows => ASCII_GLYPHS,
        Platform::Unix => BRAILLE_GLYPHS,
    };
    glyphs.iter().map(|g| (*g).to_string()).collect()
}

pub const fn default_success_symbol(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => ">",
        Platform::Unix => "✓",
    }
}

pub const fn default_error_symbol(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => "!",
        Platform::Unix => "✗",
    }
}

/// Whether stdout is attached to an interactive terminal.
pub fn is_terminal_output() -> bool {
    io::stdout().is_tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_defaults_are_ascii() {
        assert!(default_glyphs(Platform::Windows).iter().all(|g| g.is_ascii()));
        assert_eq!(default_success_symbol(Platform::Windows), ">");
        assert_eq!(default_error_symbol(Platform::Windows), "!");
    }

    #[test]
    fn unix_defaults_use_braille() {
        let glyphs = default_glyphs(Platform::Unix);
        assert_eq!(glyphs.len(), 8);
        assert_eq!(glyphs[0], "⣾");
        assert_eq!(default_success_symbol(Platform::Unix), "✓");
        assert_eq!(default_error_symbol(Platform::Unix), "✗");
    }

    #[test]
    fn defaults_are_never_empty() {
        for platform in [Platform::Windows, Platform::Unix] {
            assert!(!default_glyphs(platform).is_empty());
        }
    }
}
