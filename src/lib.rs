//! buttonlog - statistics for button-board interaction logs
//!
//! Recordings of dogs and humans talking through a board of sound buttons are
//! turned into a flat event table and a few descriptive outputs through a
//! linear pipeline: stream loading → tabulation → token selection and
//! aggregation → CSV files and charts.
//!
//! ## Outputs
//!
//! - **Event table**: one row per event with file metadata and species
//! - **Button counts**: how often each dog button was pressed
//! - **Gap times**: seconds between consecutive turns, by species transition
//! - **Time of day**: dog events per hour on a clock face
//! - **Pairs**: counts of adjacent button pairs, for dogs and for humans

pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod stats;
pub mod table;

pub use config::Config;
pub use error::AnalysisError;
pub use pipeline::{AnalysisReport, Analyzer};
pub use schema::{EventStream, EventStreamAdapter};
pub use table::{EventRow, EventTable};

/// Crate version reported by the CLI and in run reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
