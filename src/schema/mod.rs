//! Event stream input schema
//!
//! This module defines the JSON layout of a recorded button-board session and
//! the adapter that loads a directory of such recordings.

mod adapter;
mod event_stream;

pub use adapter::*;
pub use event_stream::*;
