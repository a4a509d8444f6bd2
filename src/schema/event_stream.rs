//! Event stream file schema
//!
//! One JSON file describes one recorded interaction session with the button
//! board: the agents present (dogs, humans) and the timestamped events they
//! produced (button presses, speech, gestures).

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Value of `event.type` for a press on the board
pub const BUTTON_PRESS: &str = "button_press";

/// Literal content some recorders write instead of JSON `null`
pub const NULL_CONTENT: &str = "null";

/// An agent taking part in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Latin species name, e.g. "canis familiaris"
    pub species: String,
}

/// A single timestamped event produced by an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Id of the agent that produced the event
    #[serde(deserialize_with = "id_string")]
    pub agent: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub start: String,
    pub end: String,
    /// Button label, transcript or annotation; may be null
    #[serde(default)]
    pub content: Option<String>,
}

/// Contents of one event stream file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStream {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub provenance: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl EventStream {
    /// Look up the species of an agent by id
    pub fn species_of(&self, agent_id: &str) -> Option<&str> {
        self.agents
            .iter()
            .find(|a| a.id == agent_id)
            .map(|a| a.species.as_str())
    }

    /// Validate the stream structure
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut agent_ids = HashSet::new();
        for agent in &self.agents {
            if !agent_ids.insert(agent.id.as_str()) {
                return Err(ValidationError::DuplicateAgent {
                    agent: agent.id.clone(),
                });
            }
        }

        for event in &self.events {
            if !agent_ids.contains(event.agent.as_str()) {
                return Err(ValidationError::UnknownAgent {
                    event_id: event.id.clone(),
                    agent: event.agent.clone(),
                });
            }

            let start = parse_event_time(event, "start", &event.start)?;
            let end = parse_event_time(event, "end", &event.end)?;
            if end < start {
                return Err(ValidationError::EndBeforeStart {
                    event_id: event.id.clone(),
                });
            }
        }

        Ok(())
    }
}

fn parse_event_time(
    event: &Event,
    field: &'static str,
    value: &str,
) -> Result<DateTime<FixedOffset>, ValidationError> {
    parse_timestamp(value).ok_or_else(|| ValidationError::InvalidTimestamp {
        event_id: event.id.clone(),
        field,
        value: value.to_string(),
    })
}

/// Parse an event timestamp.
///
/// Accepts RFC 3339 (`2021-03-04T18:22:05.120-05:00`). Timestamps without an
/// offset (`2021-03-04T18:22:05` or `2021-03-04 18:22:05.1`) are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Ids are strings in most recordings but some exporters emit integers
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
    })
}

/// Structural problems in an event stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed JSON: {message}")]
    Malformed { message: String },

    #[error("Agent {agent} is declared more than once")]
    DuplicateAgent { agent: String },

    #[error("Event {event_id} references undeclared agent {agent}")]
    UnknownAgent { event_id: String, agent: String },

    #[error("Event {event_id} has unparseable {field} timestamp {value:?}")]
    InvalidTimestamp {
        event_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Event {event_id} ends before it starts")]
    EndBeforeStart { event_id: String },
}
