//! Token selection
//!
//! A token is the label of a button pressed by a given species. Free-text
//! annotations ("OTHER: ...", "walk or outside", long descriptions) and empty
//! presses are not tokens.

use crate::config::FilterConfig;
use crate::table::EventRow;

/// Selects the button presses of one species that count as tokens
#[derive(Debug, Clone, Copy)]
pub struct TokenFilter<'a> {
    config: &'a FilterConfig,
    species: &'a str,
}

impl<'a> TokenFilter<'a> {
    pub fn new(config: &'a FilterConfig, species: &'a str) -> Self {
        Self { config, species }
    }

    pub fn species(&self) -> &str {
        self.species
    }

    /// Whether a row is a token of this filter's species
    pub fn accepts(&self, row: &EventRow) -> bool {
        if row.species != self.species || row.event_type != self.config.event_type {
            return false;
        }
        let Some(content) = row.content.as_deref() else {
            return false;
        };
        is_token(self.config, content)
    }

    /// Tokens among `rows`, in order
    pub fn select<'r, I>(&self, rows: I) -> Vec<&'r EventRow>
    where
        I: IntoIterator<Item = &'r EventRow>,
    {
        rows.into_iter().filter(|row| self.accepts(row)).collect()
    }
}

fn is_token(config: &FilterConfig, content: &str) -> bool {
    !content.is_empty()
        && content.chars().count() < config.max_len
        && !config.exclude_literals.iter().any(|lit| lit == content)
        && !config
            .exclude_substrings
            .iter()
            .any(|sub| !sub.is_empty() && content.contains(sub.as_str()))
}
