//! buttonlog CLI - tabulate and chart button-board recordings
//!
//! Commands:
//! - analyze: Build the event table, statistics and charts for a data directory
//! - validate: Check every event stream file in a data directory
//! - init-config: Write a default configuration file

use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use buttonlog::config::{Config, PlotFormat, DEFAULT_CONFIG_FILE};
use buttonlog::schema::EventStreamAdapter;
use buttonlog::{AnalysisError, AnalysisReport, Analyzer, VERSION};

/// buttonlog - statistics for dog/human button-board recordings
#[derive(Parser)]
#[command(name = "buttonlog")]
#[command(version = VERSION)]
#[command(about = "Tabulate and chart button-board interaction logs", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the event table, statistics and charts
    Analyze {
        /// Directory containing *.json event stream files
        data_dir: PathBuf,

        /// Output directory (overrides output.dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: ./buttonlog.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Chart image format (overrides output.format)
        #[arg(long, value_enum)]
        format: Option<PlotFormat>,

        /// Leave invalid files out instead of failing
        #[arg(long)]
        skip_invalid: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every event stream file in a directory
    Validate {
        /// Directory containing *.json event stream files
        data_dir: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a configuration file with every default spelled out
    InitConfig {
        /// Destination path
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; RUST_LOG wins over the verbosity flags
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("buttonlog={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<(), ButtonlogCliError> {
    match cli.command {
        Commands::Analyze {
            data_dir,
            output,
            config,
            format,
            skip_invalid,
            json,
        } => cmd_analyze(
            &data_dir,
            output,
            config.as_deref(),
            format,
            skip_invalid,
            json,
        ),

        Commands::Validate { data_dir, json } => cmd_validate(&data_dir, json),

        Commands::InitConfig { path, force } => cmd_init_config(&path, force),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, ButtonlogCliError> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?.unwrap_or_default(),
    };
    debug!("Configuration: {:?}", config);
    Ok(config)
}

fn cmd_analyze(
    data_dir: &Path,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
    format: Option<PlotFormat>,
    skip_invalid: bool,
    json: bool,
) -> Result<(), ButtonlogCliError> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = output {
        config.output.dir = dir;
    }
    if let Some(format) = format {
        config.output.format = format;
    }

    info!("buttonlog v{} analyzing {}", VERSION, data_dir.display());
    let report = Analyzer::new(config)
        .skip_invalid(skip_invalid)
        .run(data_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("Analysis of {}", report.data_dir.display());
    println!("==================");
    println!("Files:  {}", report.summary.files);
    println!("Events: {}", report.summary.events);
    for (species, count) in &report.summary.by_species {
        println!("  {:<20} {}", species, count);
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped:");
        for skipped in &report.skipped {
            println!("  - {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    if !report.top_buttons.is_empty() {
        println!("\nTop dog buttons:");
        for button in &report.top_buttons {
            println!("  {:>6}  {}", button.count, button.content);
        }
    }

    println!("\nGap time (seconds):");
    for gap in &report.gaps {
        match gap.median {
            Some(median) => println!("  {:<16} n={:<6} median={:.2}", gap.category, gap.count, median),
            None => println!("  {:<16} n=0", gap.category),
        }
    }

    if !report.charts_have_text {
        println!("\nNote: no font found, charts were drawn without text (set output.font)");
    }

    println!("\nWrote:");
    for path in &report.outputs {
        println!("  {}", path.display());
    }
}

fn cmd_validate(data_dir: &Path, json: bool) -> Result<(), ButtonlogCliError> {
    let loaded = EventStreamAdapter::load_dir_checked(data_dir)?;

    let report = ValidationReport {
        total_files: loaded.total_files(),
        valid_files: loaded.streams.len(),
        invalid_files: loaded.failures.len(),
        valid_events: loaded.streams.iter().map(|s| s.stream.events.len()).sum(),
        errors: loaded
            .failures
            .iter()
            .map(|r| ValidationErrorDetail {
                path: r.path.display().to_string(),
                file_id: r.file_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total files:   {}", report.total_files);
        println!("Valid files:   {}", report.valid_files);
        println!("Invalid files: {}", report.invalid_files);
        println!("Valid events:  {}", report.valid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {} ({}): {}", err.path, err.file_id, err.error);
            }
        }
    }

    if report.invalid_files > 0 {
        Err(ButtonlogCliError::ValidationFailed(report.invalid_files))
    } else {
        Ok(())
    }
}

fn cmd_init_config(path: &Path, force: bool) -> Result<(), ButtonlogCliError> {
    if path.exists() && !force {
        return Err(ButtonlogCliError::ConfigExists(path.to_path_buf()));
    }
    fs::write(path, Config::default_toml())?;
    println!("Created {} with default settings.", path.display());
    Ok(())
}

// Error types

#[derive(Debug)]
enum ButtonlogCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    ConfigExists(PathBuf),
}

impl From<io::Error> for ButtonlogCliError {
    fn from(e: io::Error) -> Self {
        ButtonlogCliError::Io(e)
    }
}

impl From<AnalysisError> for ButtonlogCliError {
    fn from(e: AnalysisError) -> Self {
        ButtonlogCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for ButtonlogCliError {
    fn from(e: serde_json::Error) -> Self {
        ButtonlogCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ButtonlogCliError> for CliError {
    fn from(e: ButtonlogCliError) -> Self {
        match e {
            ButtonlogCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ButtonlogCliError::Analysis(e) => analysis_error(e),
            ButtonlogCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ButtonlogCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} files failed validation", count),
                hint: Some("Fix the listed files or run analyze with --skip-invalid".to_string()),
            },
            ButtonlogCliError::ConfigExists(path) => CliError {
                code: "CONFIG_EXISTS".to_string(),
                message: format!("{} already exists", path.display()),
                hint: Some("Pass --force to overwrite it".to_string()),
            },
        }
    }
}

fn analysis_error(e: AnalysisError) -> CliError {
    let (code, hint) = match &e {
        AnalysisError::Io { .. } => ("IO_ERROR", Some("Check file paths and permissions")),
        AnalysisError::JsonError(_) | AnalysisError::StreamParse { .. } => {
            ("PARSE_ERROR", Some("Check JSON syntax of the event stream file"))
        }
        AnalysisError::Config { .. } => ("CONFIG_ERROR", Some("Run 'buttonlog init-config' for a valid example")),
        AnalysisError::TimestampParse(_) => ("TIMESTAMP_ERROR", Some("Timestamps must be RFC 3339")),
        AnalysisError::UnknownAgent { .. } | AnalysisError::Validation { .. } => {
            ("VALIDATION_ERROR", Some("Run 'buttonlog validate' for details"))
        }
        AnalysisError::Csv(_) => ("CSV_ERROR", Some("Check the output directory is writable")),
        AnalysisError::Render(_) => ("RENDER_ERROR", Some("Try --format svg")),
        AnalysisError::NoInput(_) => ("NO_INPUT", Some("The data directory must contain *.json files")),
    };
    CliError {
        code: code.to_string(),
        message: e.to_string(),
        hint: hint.map(str::to_string),
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_files: usize,
    valid_files: usize,
    invalid_files: usize,
    valid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    path: String,
    file_id: String,
    error: String,
}
