//! CLI theme and styling.

use colored::Colorize;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a status line.
    pub(crate) fn status(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a successful result.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format a failed result.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }
}

/// Print the welcome banner.
pub(crate) fn print_banner() {
    println!("{}", Theme::header("Welcome to the Support Agent System"));
    println!("{}", Theme::separator());
}
