//! Button press frequency

use crate::stats::filter::TokenFilter;
use crate::table::EventTable;
use serde::Serialize;
use std::collections::HashMap;

/// How often one button was pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonCount {
    pub content: String,
    pub count: usize,
}

/// Count token presses, most frequent first (ties by label)
pub fn button_counts(table: &EventTable, filter: &TokenFilter<'_>) -> Vec<ButtonCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in filter.select(table.rows()) {
        *counts.entry(row.content_str()).or_default() += 1;
    }

    let mut ranked: Vec<ButtonCount> = counts
        .into_iter()
        .map(|(content, count)| ButtonCount {
            content: content.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.content.cmp(&b.content)));
    ranked
}
