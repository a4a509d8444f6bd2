//! Descriptive statistics over the event table
//!
//! Table → token selection → per-chart aggregates. Each submodule produces
//! plain data; drawing happens in [`crate::render`].

pub mod button_count;
pub mod clock;
pub mod filter;
pub mod gaps;
pub mod ngrams;

pub use button_count::{button_counts, ButtonCount};
pub use clock::{hourly_histogram, HOURS_PER_DAY};
pub use filter::TokenFilter;
pub use gaps::{gap_series, gap_stats, turn_gaps, GapSeries, GapStats, TurnGap, TOTAL_CATEGORY};
pub use ngrams::{adjacent_pairs, write_pairs_csv, PairCount};
