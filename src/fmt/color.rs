//! ANSI color support for tag prefixes, plus the environment-driven
//! enable/disable decision.

use std::fmt;
use std::io::IsTerminal;

/// A dedicated type prevents mixing up raw u8 triples and documents color intent at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// `const` so tag styles can be compile-time constants.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Terminals need the raw `\x1b[38;2;R;G;Bm` escape — callers shouldn't hand-build it.
    #[must_use]
    pub fn fg_ansi(self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }

    /// Terminates any active SGR styling so subsequent text returns to the terminal default.
    pub const RESET: &'static str = "\x1b[0m";

    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    #[must_use]
    pub const fn gray() -> Self {
        Self::new(128, 128, 128)
    }

    #[must_use]
    pub const fn cyan() -> Self {
        Self::new(139, 233, 253)
    }

    #[must_use]
    pub const fn yellow() -> Self {
        Self::new(241, 250, 140)
    }

    #[must_use]
    pub const fn red() -> Self {
        Self::new(255, 85, 85)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Convenience wrapper — most callers just want "make this text colored" without managing reset sequences.
#[must_use]
pub fn colorize(text: &str, color: Color) -> String {
    let fg = color.fg_ansi();
    let reset = Color::RESET;
    format!("{fg}{text}{reset}")
}

/// Whether a logger renders ANSI escapes. `Auto` defers to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// `NO_COLOR` wins, then `FORCE_COLOR`, then a TTY check on stdout.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolves the mode to a concrete on/off decision.
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                if std::env::var_os("NO_COLOR").is_some() {
                    return false;
                }
                if matches!(
                    std::env::var("FORCE_COLOR").map(|v| v.to_lowercase()).as_deref(),
                    Ok("1" | "true" | "yes")
                ) {
                    return true;
                }
                std::io::stdout().is_terminal()
            }
        }
    }

    /// Config files store the mode as a string — unknown values fall back to `Auto`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "always" | "on" => Self::Always,
            "never" | "off" => Self::Never,
            _ => Self::Auto,
        }
    }
}
