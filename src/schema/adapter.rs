//! Loading event stream files from disk
//!
//! Reads every `*.json` file sitting directly in a data directory and parses
//! it into an [`EventStream`], keeping the source path for error reporting.

use crate::error::AnalysisError;
use crate::schema::event_stream::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// An event stream together with the file it came from
#[derive(Debug, Clone)]
pub struct LoadedStream {
    pub path: PathBuf,
    pub stream: EventStream,
}

/// Adapter for reading event stream files
pub struct EventStreamAdapter;

impl EventStreamAdapter {
    /// Parse a JSON string containing one event stream
    pub fn parse_stream(json: &str) -> Result<EventStream, AnalysisError> {
        let stream: EventStream = serde_json::from_str(json)?;
        Ok(stream)
    }

    /// Read and parse a single event stream file
    pub fn load_file(path: &Path) -> Result<LoadedStream, AnalysisError> {
        let json = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let stream =
            serde_json::from_str(&json).map_err(|source| AnalysisError::StreamParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(LoadedStream {
            path: path.to_path_buf(),
            stream,
        })
    }

    /// List the `*.json` files directly inside `dir`, sorted by file name
    pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                AnalysisError::io(path, e.into())
            })?;

            let is_json = entry.path().extension().and_then(|ext| ext.to_str()) == Some("json");
            if entry.file_type().is_file() && is_json {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Load every event stream in a data directory
    ///
    /// Fails on the first unreadable or malformed file, and when the directory
    /// holds no `*.json` files at all.
    pub fn load_dir(dir: &Path) -> Result<Vec<LoadedStream>, AnalysisError> {
        let files = Self::list_files(dir)?;
        if files.is_empty() {
            return Err(AnalysisError::NoInput(dir.to_path_buf()));
        }

        let mut streams = Vec::with_capacity(files.len());
        for path in files {
            let loaded = Self::load_file(&path)?;
            debug!(
                "Loaded {} ({} agents, {} events)",
                path.display(),
                loaded.stream.agents.len(),
                loaded.stream.events.len()
            );
            streams.push(loaded);
        }
        Ok(streams)
    }

    /// Load every event stream in a data directory without stopping at bad
    /// files.
    ///
    /// Unparseable and structurally invalid files are reported per file in
    /// [`LoadReport::failures`], in file name order; only valid streams are
    /// kept. Unreadable files and an empty directory are still errors.
    pub fn load_dir_checked(dir: &Path) -> Result<LoadReport, AnalysisError> {
        let files = Self::list_files(dir)?;
        if files.is_empty() {
            return Err(AnalysisError::NoInput(dir.to_path_buf()));
        }

        let mut report = LoadReport::default();
        for path in files {
            let loaded = match Self::load_file(&path) {
                Ok(loaded) => loaded,
                Err(AnalysisError::StreamParse { path, source }) => {
                    debug!("Malformed stream {}: {}", path.display(), source);
                    report.failures.push(ValidationResult {
                        file_id: file_stem(&path),
                        error: ValidationError::Malformed {
                            message: source.to_string(),
                        },
                        path,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            match loaded.stream.validate() {
                Ok(()) => report.streams.push(loaded),
                Err(error) => report.failures.push(ValidationResult {
                    path: loaded.path,
                    file_id: loaded.stream.id,
                    error,
                }),
            }
        }
        Ok(report)
    }

    /// Validate a batch of loaded streams, returning only the failures
    pub fn validate_streams(streams: &[LoadedStream]) -> Vec<ValidationResult> {
        streams
            .iter()
            .filter_map(|loaded| {
                loaded.stream.validate().err().map(|error| ValidationResult {
                    path: loaded.path.clone(),
                    file_id: loaded.stream.id.clone(),
                    error,
                })
            })
            .collect()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Outcome of [`EventStreamAdapter::load_dir_checked`]
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Streams that parsed and validated
    pub streams: Vec<LoadedStream>,
    /// Files that failed to parse or validate
    pub failures: Vec<ValidationResult>,
}

impl LoadReport {
    pub fn total_files(&self) -> usize {
        self.streams.len() + self.failures.len()
    }
}

/// A stream that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    pub path: PathBuf,
    pub file_id: String,
    pub error: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn stream_json(id: &str, agent_ref: &str) -> String {
        format!(
            r#"{{
                "id": "{id}",
                "provenance": "test",
                "start": "2021-05-01T10:00:00Z",
                "end": "2021-05-01T10:10:00Z",
                "agents": [{{"id": "dog", "species": "canis familiaris"}}],
                "events": [{{
                    "id": "e1", "agent": "{agent_ref}", "type": "button_press",
                    "start": "2021-05-01T10:01:00Z", "end": "2021-05-01T10:01:01Z",
                    "content": "play"
                }}]
            }}"#
        )
    }

    #[test]
    fn test_load_dir_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), stream_json("b", "dog")).unwrap();
        fs::write(dir.path().join("a.json"), stream_json("a", "dog")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.json"), stream_json("c", "dog")).unwrap();

        let streams = EventStreamAdapter::load_dir(dir.path()).unwrap();
        let ids: Vec<&str> = streams.iter().map(|s| s.stream.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(streams[0].path.ends_with("a.json"));
    }

    #[test]
    fn test_load_dir_empty() {
        let dir = TempDir::new().unwrap();
        let err = EventStreamAdapter::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::NoInput(_)));
    }

    #[test]
    fn test_load_dir_missing() {
        let dir = TempDir::new().unwrap();
        let err = EventStreamAdapter::load_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file_reports_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let err = EventStreamAdapter::load_dir(dir.path()).unwrap_err();
        match err {
            AnalysisError::StreamParse { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_dir_checked_reports_bad_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), stream_json("a", "dog")).unwrap();
        fs::write(dir.path().join("b.json"), "{ truncated").unwrap();
        fs::write(dir.path().join("c.json"), stream_json("c", "cat")).unwrap();

        let report = EventStreamAdapter::load_dir_checked(dir.path()).unwrap();
        assert_eq!(report.total_files(), 3);
        assert_eq!(report.streams.len(), 1);
        assert_eq!(report.streams[0].stream.id, "a");

        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].path.ends_with("b.json"));
        assert_eq!(report.failures[0].file_id, "b");
        assert!(matches!(
            report.failures[0].error,
            ValidationError::Malformed { .. }
        ));
        assert_eq!(report.failures[1].file_id, "c");
        assert!(matches!(
            report.failures[1].error,
            ValidationError::UnknownAgent { .. }
        ));
    }

    #[test]
    fn test_load_dir_checked_empty() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            EventStreamAdapter::load_dir_checked(dir.path()),
            Err(AnalysisError::NoInput(_))
        ));
    }

    #[test]
    fn test_validate_streams() {
        let good = EventStreamAdapter::parse_stream(&stream_json("good", "dog")).unwrap();
        let bad = EventStreamAdapter::parse_stream(&stream_json("bad", "cat")).unwrap();
        let streams = vec![
            LoadedStream {
                path: PathBuf::from("good.json"),
                stream: good,
            },
            LoadedStream {
                path: PathBuf::from("bad.json"),
                stream: bad,
            },
        ];

        let failures = EventStreamAdapter::validate_streams(&streams);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].file_id, "bad");
        assert!(matches!(
            failures[0].error,
            ValidationError::UnknownAgent { .. }
        ));
    }
}
