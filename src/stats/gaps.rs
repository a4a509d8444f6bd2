//! Turn-taking gap time
//!
//! Within a recording, the gap before an event is the time between the end
//! of the previous event and the start of this one. Overlapping events give
//! negative gaps. Each gap is labelled with the species transition it spans,
//! e.g. `human -> dog` when a dog answers a human.

use crate::config::SpeciesConfig;
use crate::table::{EventRow, EventTable};
use serde::Serialize;
use std::collections::BTreeMap;

/// Category holding every gap regardless of transition
pub const TOTAL_CATEGORY: &str = "total";

/// Gap preceding one event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnGap {
    pub file_id: String,
    pub event_id: String,
    /// Species label of the previous event's agent
    pub from: String,
    /// Species label of this event's agent
    pub to: String,
    pub seconds: f64,
}

impl TurnGap {
    pub fn transition(&self) -> String {
        format!("{} -> {}", self.from, self.to)
    }

    pub fn is_turn(&self) -> bool {
        self.from != self.to
    }
}

/// Gaps between consecutive events of every recording, ordered by start time
pub fn turn_gaps(table: &EventTable, species: &SpeciesConfig) -> Vec<TurnGap> {
    let mut gaps = Vec::new();
    for (_, mut rows) in table.groups_by_file() {
        rows.sort_by_key(|row| row.start);
        gaps.extend(rows.windows(2).map(|pair| gap_between(pair[0], pair[1], species)));
    }
    gaps
}

fn gap_between(prev: &EventRow, curr: &EventRow, species: &SpeciesConfig) -> TurnGap {
    let millis = (curr.start - prev.end).num_milliseconds();
    TurnGap {
        file_id: curr.file_id.clone(),
        event_id: curr.event_id.clone(),
        from: species.label(&prev.species).to_string(),
        to: species.label(&curr.species).to_string(),
        seconds: millis as f64 / 1000.0,
    }
}

/// Gap values of one chart category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSeries {
    pub category: String,
    pub seconds: Vec<f64>,
}

/// Plot categories: each cross-species transition, then the total
pub fn gap_series(gaps: &[TurnGap]) -> Vec<GapSeries> {
    let mut by_transition: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for gap in gaps.iter().filter(|g| g.is_turn()) {
        by_transition
            .entry(gap.transition())
            .or_default()
            .push(gap.seconds);
    }

    let mut series: Vec<GapSeries> = by_transition
        .into_iter()
        .rev()
        .map(|(category, seconds)| GapSeries { category, seconds })
        .collect();
    series.push(GapSeries {
        category: TOTAL_CATEGORY.to_string(),
        seconds: gaps.iter().map(|g| g.seconds).collect(),
    });
    series
}

/// Summary of one gap category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapStats {
    pub category: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn gap_stats(series: &GapSeries) -> GapStats {
    let mut sorted = series.seconds.clone();
    sorted.sort_by(f64::total_cmp);
    let count = sorted.len();

    let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
    let median = match count {
        0 => None,
        n if n % 2 == 1 => Some(sorted[n / 2]),
        n => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    };

    GapStats {
        category: series.category.clone(),
        count,
        mean,
        median,
        min: sorted.first().copied(),
        max: sorted.last().copied(),
    }
}
