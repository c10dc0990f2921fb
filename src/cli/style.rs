//! Terminal styling helpers
//!
//! Colors are written unconditionally; `anstream` strips them when stdout
//! isn't a terminal.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Success marker
pub const CHECK: &str = "✓";

/// Styled success marker
pub fn check() -> String {
    CHECK.green().to_string()
}

/// Styled bullet arrow
pub fn arrow() -> String {
    "→".dimmed().to_string()
}

/// Semantic styles for any displayable value
pub trait Stylize {
    /// Headings and key values
    fn emphasis(&self) -> String;
    /// Names: branches, repositories, PR numbers
    fn accent(&self) -> String;
    /// Secondary detail
    fn muted(&self) -> String;
    /// Completed actions
    fn success(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn success(&self) -> String {
        self.green().bold().to_string()
    }
}
