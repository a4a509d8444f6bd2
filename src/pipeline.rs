//! Analysis pipeline orchestration
//!
//! This module provides the public API for a full run: event stream files →
//! flat table → statistics → CSV files and charts in the output directory.

use crate::config::Config;
use crate::error::AnalysisError;
use crate::render::ChartRenderer;
use crate::schema::{EventStreamAdapter, LoadedStream};
use crate::stats::{
    adjacent_pairs, button_counts, gap_series, gap_stats, hourly_histogram, turn_gaps,
    write_pairs_csv, ButtonCount, GapStats, PairCount, TokenFilter,
};
use crate::table::{EventTable, TableSummary};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Number of entries kept in the report's ranked lists
const REPORT_TOP_N: usize = 20;

pub const BUTTON_COUNT_CHART: &str = "button_count";
pub const GAPS_CHART: &str = "gaps";
pub const CLOCK_CHART: &str = "press_by_hour";
pub const CANINE_NGRAMS_FILE: &str = "canine_ngrams.csv";
pub const HUMAN_NGRAMS_FILE: &str = "human_ngrams.csv";
pub const REPORT_FILE: &str = "report.json";

/// A stream left out of the analysis because it failed validation
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub file_id: String,
    pub reason: String,
}

/// Everything a run computed, plus the files it wrote
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub data_dir: PathBuf,
    pub summary: TableSummary,
    pub skipped: Vec<SkippedFile>,
    /// Most pressed dog buttons
    pub top_buttons: Vec<ButtonCount>,
    pub gaps: Vec<GapStats>,
    /// Dog events per hour of day, index 0 = midnight
    pub hourly: Vec<usize>,
    pub canine_pairs: Vec<PairCount>,
    pub human_pairs: Vec<PairCount>,
    pub charts_have_text: bool,
    pub outputs: Vec<PathBuf>,
}

/// Runs the whole analysis for one data directory
pub struct Analyzer {
    config: Config,
    skip_invalid: bool,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            skip_invalid: false,
        }
    }

    /// Leave invalid streams out instead of failing the run
    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load and validate every stream in `data_dir`
    ///
    /// Malformed or invalid files fail the run unless invalid files are
    /// skipped, in which case they are returned as [`SkippedFile`]s.
    pub fn load(
        &self,
        data_dir: &Path,
    ) -> Result<(Vec<LoadedStream>, Vec<SkippedFile>), AnalysisError> {
        let report = EventStreamAdapter::load_dir_checked(data_dir)?;
        info!(
            "Loaded {} of {} event stream files from {}",
            report.streams.len(),
            report.total_files(),
            data_dir.display()
        );

        let mut failures = report.failures.into_iter();
        if !self.skip_invalid {
            return match failures.next() {
                Some(f) => Err(AnalysisError::Validation {
                    path: f.path,
                    source: f.error,
                }),
                None => Ok((report.streams, Vec::new())),
            };
        }

        let skipped = failures
            .map(|f| {
                warn!("Skipping {}: {}", f.path.display(), f.error);
                SkippedFile {
                    path: f.path,
                    file_id: f.file_id,
                    reason: f.error.to_string(),
                }
            })
            .collect();
        Ok((report.streams, skipped))
    }

    /// Full run: load, tabulate, compute and write every output
    pub fn run(&self, data_dir: &Path) -> Result<AnalysisReport, AnalysisError> {
        let (streams, skipped) = self.load(data_dir)?;
        let table = EventTable::from_streams(&streams)?;

        let mut report = self.analyze_table(&table)?;
        report.data_dir = data_dir.to_path_buf();
        report.skipped = skipped;

        let report_path = self.config.output.dir.join(REPORT_FILE);
        fs::write(&report_path, serde_json::to_string_pretty(&report)?)
            .map_err(|e| AnalysisError::io(&report_path, e))?;
        report.outputs.push(report_path);

        Ok(report)
    }

    /// Compute statistics for an already built table and write the table,
    /// charts and pair counts
    pub fn analyze_table(&self, table: &EventTable) -> Result<AnalysisReport, AnalysisError> {
        let config = &self.config;
        let out_dir = &config.output.dir;
        fs::create_dir_all(out_dir).map_err(|e| AnalysisError::io(out_dir, e))?;

        let summary = table.summary();
        info!(
            "Tabulated {} events from {} files ({:?})",
            summary.events, summary.files, summary.by_species
        );

        let mut outputs = Vec::new();

        // Stage 1: flat table
        let table_path = config.table_path();
        table.write_csv(&table_path)?;
        outputs.push(table_path);

        let renderer = ChartRenderer::new(&config.output);
        let dog = TokenFilter::new(&config.filter, &config.species.dog);
        let human = TokenFilter::new(&config.filter, &config.species.human);

        // Stage 2: button press frequency
        let counts = button_counts(table, &dog);
        info!("{} distinct dog buttons", counts.len());
        for c in counts.iter().take(REPORT_TOP_N) {
            info!("  {:>6}  {}", c.count, c.content);
        }
        let path = config.plot_path(BUTTON_COUNT_CHART);
        renderer.button_counts(&counts, &path)?;
        outputs.push(path);

        // Stage 3: turn-taking gaps
        let gaps = turn_gaps(table, &config.species);
        let series = gap_series(&gaps);
        let gap_summary: Vec<GapStats> = series.iter().map(gap_stats).collect();
        for stats in &gap_summary {
            info!(
                "Gap {}: n={} median={:?}s",
                stats.category, stats.count, stats.median
            );
        }
        let path = config.plot_path(GAPS_CHART);
        renderer.gaps(&series, &path)?;
        outputs.push(path);

        // Stage 4: time of day
        let hourly = hourly_histogram(table, &config.species.dog);
        let path = config.plot_path(CLOCK_CHART);
        renderer.clock(&hourly, &path)?;
        outputs.push(path);

        // Stage 5: co-occurring pairs
        let canine_pairs = adjacent_pairs(table, &dog);
        let path = out_dir.join(CANINE_NGRAMS_FILE);
        write_pairs_csv(&canine_pairs, &path)?;
        outputs.push(path);

        let human_pairs = adjacent_pairs(table, &human);
        let path = out_dir.join(HUMAN_NGRAMS_FILE);
        write_pairs_csv(&human_pairs, &path)?;
        outputs.push(path);
        info!(
            "{} dog pairs, {} human pairs",
            canine_pairs.len(),
            human_pairs.len()
        );

        Ok(AnalysisReport {
            data_dir: PathBuf::new(),
            summary,
            skipped: Vec::new(),
            top_buttons: counts.into_iter().take(REPORT_TOP_N).collect(),
            gaps: gap_summary,
            hourly: hourly.to_vec(),
            canine_pairs: canine_pairs.into_iter().take(REPORT_TOP_N).collect(),
            human_pairs: human_pairs.into_iter().take(REPORT_TOP_N).collect(),
            charts_have_text: renderer.has_text(),
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotFormat;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_stream_json(id: &str, dog_agent: &str) -> String {
        format!(
            r#"{{
                "id": "{id}",
                "provenance": "video",
                "start": "2021-03-04T18:20:00Z",
                "end": "2021-03-04T18:30:00Z",
                "agents": [
                    {{"id": "bunny", "species": "canis familiaris"}},
                    {{"id": "alexis", "species": "homo sapiens"}}
                ],
                "events": [
                    {{"id": "e1", "agent": "alexis", "type": "button_press",
                      "start": "2021-03-04T18:21:00Z", "end": "2021-03-04T18:21:01Z",
                      "content": "walk"}},
                    {{"id": "e2", "agent": "{dog_agent}", "type": "button_press",
                      "start": "2021-03-04T18:21:03Z", "end": "2021-03-04T18:21:04Z",
                      "content": "outside"}},
                    {{"id": "e3", "agent": "bunny", "type": "button_press",
                      "start": "2021-03-04T18:21:05Z", "end": "2021-03-04T18:21:06Z",
                      "content": "play"}},
                    {{"id": "e4", "agent": "alexis", "type": "speech",
                      "start": "2021-03-04T18:21:09Z", "end": "2021-03-04T18:21:11Z",
                      "content": "ok let's go"}}
                ]
            }}"#
        )
    }

    fn config_for(out: &Path) -> Config {
        let mut config = Config::default();
        config.output.dir = out.to_path_buf();
        config.output.format = PlotFormat::Svg;
        config.output.width = 400;
        config.output.height = 300;
        config
    }

    #[test]
    fn test_full_run_writes_outputs() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(data.path().join("s1.json"), sample_stream_json("s1", "bunny")).unwrap();
        fs::write(data.path().join("s2.json"), sample_stream_json("s2", "bunny")).unwrap();

        let report = Analyzer::new(config_for(out.path())).run(data.path()).unwrap();

        assert_eq!(report.summary.files, 2);
        assert_eq!(report.summary.events, 8);
        assert_eq!(
            report
                .top_buttons
                .iter()
                .map(|b| (b.content.as_str(), b.count))
                .collect::<Vec<_>>(),
            vec![("outside", 2), ("play", 2)]
        );
        assert_eq!(report.hourly[18], 4);
        assert_eq!(report.canine_pairs.len(), 1);
        assert_eq!(report.canine_pairs[0].count, 2);
        assert!(report.human_pairs.is_empty());

        let total = report.gaps.iter().find(|g| g.category == "total").unwrap();
        assert_eq!(total.count, 6);
        let answer = report.gaps.iter().find(|g| g.category == "human -> dog").unwrap();
        assert_eq!(answer.count, 2);
        assert_eq!(answer.median, Some(2.0));

        for name in [
            "table.csv",
            "button_count.svg",
            "gaps.svg",
            "press_by_hour.svg",
            "canine_ngrams.csv",
            "human_ngrams.csv",
            "report.json",
        ] {
            assert!(out.path().join(name).exists(), "{name} missing");
        }
        let pairs = fs::read_to_string(out.path().join("canine_ngrams.csv")).unwrap();
        assert_eq!(pairs, "first,second,count\noutside,play,2\n");
    }

    #[test]
    fn test_invalid_stream_fails_by_default() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(data.path().join("good.json"), sample_stream_json("good", "bunny")).unwrap();
        fs::write(data.path().join("bad.json"), sample_stream_json("bad", "ghost")).unwrap();

        let err = Analyzer::new(config_for(out.path()))
            .run(data.path())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Validation { ref path, .. } if path.ends_with("bad.json")));
    }

    #[test]
    fn test_invalid_stream_skipped_on_request() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(data.path().join("good.json"), sample_stream_json("good", "bunny")).unwrap();
        fs::write(data.path().join("bad.json"), sample_stream_json("bad", "ghost")).unwrap();

        let report = Analyzer::new(config_for(out.path()))
            .skip_invalid(true)
            .run(data.path())
            .unwrap();
        assert_eq!(report.summary.files, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file_id, "bad");
    }
    #[test]
    fn test_malformed_stream_fails_by_default() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(data.path().join("good.json"), sample_stream_json("good", "bunny")).unwrap();
        fs::write(data.path().join("bad.json"), "{ truncated").unwrap();

        let err = Analyzer::new(config_for(out.path()))
            .run(data.path())
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Validation {
                source: crate::schema::ValidationError::Malformed { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_stream_skipped_on_request() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(data.path().join("good.json"), sample_stream_json("good", "bunny")).unwrap();
        fs::write(data.path().join("bad.json"), "{ truncated").unwrap();

        let report = Analyzer::new(config_for(out.path()))
            .skip_invalid(true)
            .run(data.path())
            .unwrap();
        assert_eq!(report.summary.files, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file_id, "bad");
        assert!(report.skipped[0].path.ends_with("bad.json"));
    }

    fn assert_non_empty(path: &Path) {
        let len = fs::metadata(path)
            .unwrap_or_else(|e| panic!("{} missing: {e}", path.display()))
            .len();
        assert!(len > 0, "{} is empty", path.display());
    }

    #[test]
    fn test_default_format_writes_png_charts() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(data.path().join("s1.json"), sample_stream_json("s1", "bunny")).unwrap();

        let mut config = Config::default();
        config.output.dir = out.path().to_path_buf();
        config.output.width = 400;
        config.output.height = 300;
        assert_eq!(config.output.format, PlotFormat::Png);

        let report = Analyzer::new(config).run(data.path()).unwrap();
        for name in ["button_count.png", "gaps.png", "press_by_hour.png"] {
            let path = out.path().join(name);
            assert!(report.outputs.contains(&path));
            assert_non_empty(&path);
        }
    }

    #[test]
    fn test_empty_table_still_renders() {
        let out = TempDir::new().unwrap();
        for format in [PlotFormat::Png, PlotFormat::Svg] {
            let mut config = config_for(out.path());
            config.output.format = format;

            let report = Analyzer::new(config).analyze_table(&EventTable::default()).unwrap();
            assert_eq!(report.summary.events, 0);
            assert!(report.top_buttons.is_empty());
            for path in &report.outputs {
                assert_non_empty(path);
            }
        }
    }

    #[test]
    fn test_all_files_skipped() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(data.path().join("bad.json"), "[]").unwrap();

        let report = Analyzer::new(config_for(out.path()))
            .skip_invalid(true)
            .run(data.path())
            .unwrap();
        assert_eq!(report.summary.events, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_non_empty(&out.path().join("gaps.svg"));
    }

    #[test]
    fn test_svg_text_follows_font_availability() {
        let out = TempDir::new().unwrap();
        let config = config_for(out.path());
        let renderer = ChartRenderer::new(&config.output);
        let report = Analyzer::new(config).analyze_table(&EventTable::default()).unwrap();
        assert_eq!(report.charts_have_text, renderer.has_text());
    }
}
