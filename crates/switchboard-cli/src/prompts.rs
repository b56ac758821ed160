//! Collects session attributes, prompting for anything not given as a flag.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use switchboard_core::{ISSUE_GENERAL, SessionContext};

/// Values supplied on the command line.
#[derive(Debug, Default)]
pub(crate) struct Provided {
    pub(crate) name: Option<String>,
    pub(crate) premium: Option<bool>,
    pub(crate) issue_type: Option<String>,
    pub(crate) request: Option<String>,
}

/// Parse a yes/no answer.
pub(crate) fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(format!("expected yes or no, got '{other}'")),
    }
}

/// Routing matches issue types exactly, so user input is trimmed and
/// lowercased first.
pub(crate) fn normalize_issue_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Build the session context and request, prompting where needed.
pub(crate) fn collect(provided: Provided) -> Result<(SessionContext, String)> {
    let theme = ColorfulTheme::default();

    let name = match provided.name {
        Some(name) => name,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Enter your name")
            .interact_text()
            .context("failed to read name")?,
    };

    let premium = match provided.premium {
        Some(premium) => premium,
        None => Confirm::with_theme(&theme)
            .with_prompt("Are you a premium user?")
            .default(false)
            .interact()
            .context("failed to read premium status")?,
    };

    let issue_type = match provided.issue_type {
        Some(issue_type) => issue_type,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("What type of issue are you facing? (billing/technical/general)")
            .default(ISSUE_GENERAL.to_string())
            .interact_text()
            .context("failed to read issue type")?,
    };

    let request = match provided.request {
        Some(request) => request,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Please describe your issue")
            .interact_text()
            .context("failed to read issue description")?,
    };

    let ctx = SessionContext::new(name.trim(), premium, normalize_issue_type(&issue_type));
    Ok((ctx, request))
}
