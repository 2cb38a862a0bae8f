use std::fmt;

use chrono::{DateTime, Utc};
use inquire::Select;

use crate::types::Prompt;

/// Length of the id prefix shown in listings and accepted as an argument.
pub const SHORT_ID_LEN: usize = 8;

/// Prompt with a one-line summary for pickers and listings
pub struct PromptDisplay<'a> {
    pub prompt: &'a Prompt,
}

impl fmt::Display for PromptDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = &self.prompt.record;
        write!(
            f,
            "{}  {}  [{}/{}]",
            short_id(&record.id),
            record.title,
            record.provider,
            record.model
        )?;
        if !record.tags.is_empty() {
            write!(f, "  #{}", record.tags.join(" #"))?;
        }
        write!(f, "  updated {}", format_relative_time(&record.updated_at))?;
        if self.prompt.content.is_none() {
            write!(f, "  (content unavailable)")?;
        }
        Ok(())
    }
}

/// Time-ordered ids share their leading characters, so the short form is
/// taken from the random tail.
#[must_use]
pub fn short_id(id: &str) -> &str {
    let start = id.len().saturating_sub(SHORT_ID_LEN);
    id.get(start..).unwrap_or(id)
}

/// Finds the prompt whose id equals `wanted` or ends with it.
pub fn find_prompt<'a>(prompts: &'a [Prompt], wanted: &str) -> anyhow::Result<&'a Prompt> {
    if let Some(exact) = prompts.iter().find(|p| p.record.id == wanted) {
        return Ok(exact);
    }
    let matches: Vec<&Prompt> = prompts
        .iter()
        .filter(|p| !wanted.is_empty() && p.record.id.ends_with(wanted))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one),
        [] => anyhow::bail!("Prompt not found: {wanted}"),
        _ => anyhow::bail!("'{wanted}' matches {} prompts; use the full id", matches.len()),
    }
}

pub fn select_prompt<'a>(prompts: &'a [Prompt], message: &str) -> anyhow::Result<&'a Prompt> {
    if prompts.is_empty() {
        anyhow::bail!("No prompts found.");
    }
    let displays: Vec<PromptDisplay<'_>> = prompts.iter().map(|prompt| PromptDisplay { prompt }).collect();
    let selected = Select::new(message, displays)
        .with_page_size(15)
        .with_vim_mode(true)
        .with_help_message("Type to filter, Enter to select")
        .prompt()?;
    Ok(selected.prompt)
}

pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(inquire::Confirm::new(message)
            .with_default(false)
            .prompt()?)
    }
}

/// Coarse age such as "5 minutes ago"; months are 30 days, years 365.
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let secs = Utc::now().signed_duration_since(*dt).num_seconds();
    if secs < 0 {
        return "in the future".to_string();
    }
    if secs < 60 {
        return "just now".to_string();
    }

    const UNITS: [(i64, &str); 5] = [
        (365 * 86_400, "year"),
        (30 * 86_400, "month"),
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
    ];
    let (size, unit) = UNITS
        .into_iter()
        .find(|(size, _)| secs >= *size)
        .unwrap_or((60, "minute"));
    match secs / size {
        1 => format!("1 {unit} ago"),
        n => format!("{n} {unit}s ago"),
    }
}
