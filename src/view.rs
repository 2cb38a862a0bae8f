//! Filtering, faceting and sorting over a fetched prompt collection.
//!
//! Everything here is a pure function of its inputs.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use feruca::{Collator, Locale, Tailoring};

use crate::types::{Prompt, Provider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Title,
    #[default]
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionQuery {
    pub search: String,
    /// Empty means "any tag".
    pub tags: BTreeSet<String>,
    /// Empty means "any provider".
    pub providers: BTreeSet<Provider>,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl CollectionQuery {
    #[must_use]
    pub fn matches(&self, prompt: &Prompt) -> bool {
        self.matches_search(prompt) && self.matches_tags(prompt) && self.matches_provider(prompt)
    }

    fn matches_search(&self, prompt: &Prompt) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let record = &prompt.record;
        record.title.to_lowercase().contains(&needle)
            || record.description.to_lowercase().contains(&needle)
            || record.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    fn matches_tags(&self, prompt: &Prompt) -> bool {
        self.tags.is_empty() || prompt.record.tags.iter().any(|t| self.tags.contains(t))
    }

    fn matches_provider(&self, prompt: &Prompt) -> bool {
        self.providers.is_empty() || self.providers.contains(&prompt.record.provider)
    }
}

/// Root-locale Unicode collation without the code point tiebreak, so titles
/// that collate equal stay equal.
fn title_collator() -> Collator {
    Collator::new(Tailoring::Cldr(Locale::Root), true, false)
}

/// Collated title comparison ignoring case; equal keys keep their input order.
fn compare_titles(collator: &mut Collator, a: &Prompt, b: &Prompt) -> Ordering {
    let a = a.record.title.to_lowercase();
    let b = b.record.title.to_lowercase();
    collator.collate(a.as_str(), b.as_str())
}

/// Applies the query: filters are ANDed, the sort is stable.
#[must_use]
pub fn apply<'a>(prompts: &'a [Prompt], query: &CollectionQuery) -> Vec<&'a Prompt> {
    let mut out: Vec<&Prompt> = prompts.iter().filter(|p| query.matches(p)).collect();

    let mut collator = title_collator();
    let compare = |a: &&Prompt, b: &&Prompt| {
        let ord = match query.sort {
            SortField::Title => compare_titles(&mut collator, a, b),
            SortField::UpdatedAt => a.record.updated_at.cmp(&b.record.updated_at),
        };
        match query.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    };
    out.sort_by(compare);
    out
}

/// Every distinct tag with the number of prompts carrying it, in first-seen order.
#[must_use]
pub fn tag_facets(prompts: &[Prompt]) -> Vec<(String, usize)> {
    let mut facets: Vec<(String, usize)> = Vec::new();
    for tag in prompts.iter().flat_map(|p| p.record.tags.iter()) {
        match facets.iter_mut().find(|(t, _)| t == tag) {
            Some((_, count)) => *count += 1,
            None => facets.push((tag.clone(), 1)),
        }
    }
    facets
}

/// Providers in use with their prompt counts, in enumeration order.
#[must_use]
pub fn provider_facets(prompts: &[Prompt]) -> Vec<(Provider, usize)> {
    Provider::ALL
        .into_iter()
        .map(|p| (p, prompts.iter().filter(|x| x.record.provider == p).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}
