//! Co-occurrence of adjacent tokens
//!
//! Consecutive tokens within one recording form an unordered pair; pairs are
//! counted across all recordings.

use crate::error::AnalysisError;
use crate::stats::filter::TokenFilter;
use crate::table::EventTable;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// An unordered token pair and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairCount {
    pub first: String,
    pub second: String,
    pub count: usize,
}

/// Count adjacent token pairs per recording, most common first.
///
/// Tokens are taken in recording order. Pairs with equal counts keep the
/// order in which they were first seen.
pub fn adjacent_pairs(table: &EventTable, filter: &TokenFilter<'_>) -> Vec<PairCount> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut pairs: Vec<PairCount> = Vec::new();

    for (_, rows) in table.groups_by_file() {
        let tokens = filter.select(rows);
        for window in tokens.windows(2) {
            let (prev, curr) = (window[0].content_str(), window[1].content_str());
            let key = if prev <= curr { (prev, curr) } else { (curr, prev) };

            match index.get(&key) {
                Some(&i) => pairs[i].count += 1,
                None => {
                    index.insert(key, pairs.len());
                    pairs.push(PairCount {
                        first: key.0.to_string(),
                        second: key.1.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    // stable: ties stay in first-seen order
    pairs.sort_by(|a, b| b.count.cmp(&a.count));
    pairs
}

/// Write ranked pairs as `first,second,count` CSV
pub fn write_pairs_csv(pairs: &[PairCount], path: &Path) -> Result<(), AnalysisError> {
    let mut writer = csv::Writer::from_path(path)?;
    if pairs.is_empty() {
        writer.write_record(["first", "second", "count"])?;
    }
    for pair in pairs {
        writer.serialize(pair)?;
    }
    writer.flush().map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}
