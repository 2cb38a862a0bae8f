use chrono::{DateTime, Utc};

use crate::types::PromptRecord;

const SEPARATOR: char = '-';
const EXTENSION: &str = ".md";
const FALLBACK_SLUG: &str = "prompt";

/// Lower-cases `title` and collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, with no leading or trailing separator.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Content file name for a prompt titled `title`, created at `now`.
///
/// When other records already use `<slug>-` as a prefix, their count is
/// appended to the slug before the millisecond timestamp. The record with
/// id `exclude_id` (the one being renamed) is left out of that count.
#[must_use]
pub fn derive_filename(
    title: &str,
    existing: &[PromptRecord],
    exclude_id: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    let mut base = slugify(title);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }

    let prefix = format!("{base}{SEPARATOR}");
    let collisions = existing
        .iter()
        .filter(|r| Some(r.id.as_str()) != exclude_id)
        .filter(|r| r.filename.starts_with(&prefix))
        .count();

    if collisions > 0 {
        base = format!("{base}{SEPARATOR}{collisions}");
    }

    format!("{base}{SEPARATOR}{}{EXTENSION}", now.timestamp_millis())
}
