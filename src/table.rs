//! Flattened event table
//!
//! Every event of every stream becomes one [`EventRow`] carrying its file's
//! metadata and the species of the agent that produced it.

use crate::error::AnalysisError;
use crate::schema::{parse_timestamp, EventStream, LoadedStream};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// One event, denormalized with its stream metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub file_id: String,
    pub provenance: String,
    pub file_start: String,
    pub file_end: String,
    pub event_id: String,
    pub agent: String,
    pub event_type: String,
    #[serde(serialize_with = "rfc3339")]
    pub start: DateTime<FixedOffset>,
    #[serde(serialize_with = "rfc3339")]
    pub end: DateTime<FixedOffset>,
    pub species: String,
    pub content: Option<String>,
}

impl EventRow {
    /// Content string, empty when the event carries none
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Flatten one event stream into rows, in event order
pub fn tabulate(stream: &EventStream) -> Result<Vec<EventRow>, AnalysisError> {
    let agent_to_species: HashMap<&str, &str> = stream
        .agents
        .iter()
        .map(|a| (a.id.as_str(), a.species.as_str()))
        .collect();

    stream
        .events
        .iter()
        .map(|event| -> Result<EventRow, AnalysisError> {
            let species = agent_to_species.get(event.agent.as_str()).ok_or_else(|| {
                AnalysisError::UnknownAgent {
                    file_id: stream.id.clone(),
                    event_id: event.id.clone(),
                    agent: event.agent.clone(),
                }
            })?;

            Ok(EventRow {
                file_id: stream.id.clone(),
                provenance: stream.provenance.clone(),
                file_start: stream.start.clone(),
                file_end: stream.end.clone(),
                event_id: event.id.clone(),
                agent: event.agent.clone(),
                event_type: event.event_type.clone(),
                start: parse_row_time(&event.start)?,
                end: parse_row_time(&event.end)?,
                species: species.to_string(),
                content: event.content.clone(),
            })
        })
        .collect()
}

fn rfc3339<S>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339())
}

fn parse_row_time(value: &str) -> Result<DateTime<FixedOffset>, AnalysisError> {
    parse_timestamp(value).ok_or_else(|| AnalysisError::TimestampParse(value.to_string()))
}

/// All events of a data directory, one row per event
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    rows: Vec<EventRow>,
}

/// Row counts of an [`EventTable`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub files: usize,
    pub events: usize,
    pub by_species: BTreeMap<String, usize>,
    pub by_event_type: BTreeMap<String, usize>,
}

impl EventTable {
    pub fn new(rows: Vec<EventRow>) -> Self {
        Self { rows }
    }

    /// Tabulate every loaded stream, keeping load order
    pub fn from_streams(streams: &[LoadedStream]) -> Result<Self, AnalysisError> {
        let mut rows = Vec::new();
        for loaded in streams {
            rows.extend(tabulate(&loaded.stream)?);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[EventRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows grouped by `file_id` (sorted by id), each group in table order
    pub fn groups_by_file(&self) -> BTreeMap<&str, Vec<&EventRow>> {
        let mut groups: BTreeMap<&str, Vec<&EventRow>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row.file_id.as_str()).or_default().push(row);
        }
        groups
    }

    pub fn summary(&self) -> TableSummary {
        let mut summary = TableSummary {
            files: self.groups_by_file().len(),
            events: self.rows.len(),
            ..Default::default()
        };
        for row in &self.rows {
            *summary.by_species.entry(row.species.clone()).or_default() += 1;
            *summary
                .by_event_type
                .entry(row.event_type.clone())
                .or_default() += 1;
        }
        summary
    }

    /// Write the table as CSV with a header row
    pub fn write_csv(&self, path: &Path) -> Result<(), AnalysisError> {
        let mut writer = csv::Writer::from_path(path)?;
        if self.rows.is_empty() {
            writer.write_record([
                "file_id",
                "provenance",
                "file_start",
                "file_end",
                "event_id",
                "agent",
                "event_type",
                "start",
                "end",
                "species",
                "content",
            ])?;
        }
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| AnalysisError::io(path, e))?;
        Ok(())
    }
}
