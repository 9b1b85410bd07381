//! Pulse CLI - Command-line interface for Pulse Insights
//!
//! Commands:
//! - insights: Generate insights from recent metric records
//! - report: Print the seven-day summary
//! - validate: Check records for out-of-range values and ordering
//! - doctor: Diagnose configuration and data files

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pulse_insights::config::PulseConfig;
use pulse_insights::envelope::EnvelopeEncoder;
use pulse_insights::logging::init_logging;
use pulse_insights::presentation::InsightFeed;
use pulse_insights::report::{TrendDirection, WeeklyReport};
use pulse_insights::source::{
    parse_records, parse_records_ndjson, parse_rows, parse_rows_ndjson, InMemorySource,
    JsonFileSource, MetricSource, SourceFormat,
};
use pulse_insights::types::{HealthMetricRecord, Insight};
use pulse_insights::validate::collect_issues;
use pulse_insights::{InsightEngine, InsightError, ENGINE_VERSION, PRODUCER_NAME};

/// Pulse - deterministic wellness insights from daily wearable metrics
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Generate wellness insights from daily health metrics", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Input format (defaults to the file extension, JSON for stdin)
    #[arg(long)]
    input_format: Option<InputFormat>,

    /// Read stored metric rows and select this user's records
    #[arg(short, long)]
    user: Option<String>,

    /// Maximum number of recent records to use
    #[arg(long)]
    max_records: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate insights from recent metric records
    Insights {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Group text output into category sections
        #[arg(long)]
        grouped: bool,

        /// Skip input validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Print the seven-day summary
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Skip input validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Check records for out-of-range values and ordering
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and data files
    Doctor {
        /// Check a metrics data file
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    /// JSON array
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PulseCliError> {
    // Doctor reports a broken config file instead of failing on it
    let config = match cli.command {
        Commands::Doctor { .. } => PulseConfig::load_or_default(cli.config.as_deref()).unwrap_or_default(),
        _ => PulseConfig::load_or_default(cli.config.as_deref())?,
    };
    init_logging(&config.log)?;

    match cli.command {
        Commands::Insights {
            input,
            format,
            grouped,
            no_validate,
        } => cmd_insights(&config, &input, format, grouped, no_validate),

        Commands::Report {
            input,
            format,
            no_validate,
        } => cmd_report(&config, &input, format, no_validate),

        Commands::Validate { input, json } => cmd_validate(&config, &input, json),

        Commands::Doctor { data, json } => cmd_doctor(cli.config.as_deref(), data.as_deref(), json),
    }
}

fn cmd_insights(
    config: &PulseConfig,
    input: &InputArgs,
    format: OutputFormat,
    grouped: bool,
    no_validate: bool,
) -> Result<(), PulseCliError> {
    let records = load_records(config, input)?;

    let mut engine_config = config.engine.clone();
    if no_validate {
        engine_config.validate_input = false;
    }
    let insights = InsightEngine::with_config(engine_config).run(&records)?;

    match format {
        OutputFormat::Text => print_insights(insights, grouped),
        OutputFormat::Json => {
            let envelope = EnvelopeEncoder::new().encode(&records, insights);
            println!("{}", serde_json::to_string(&envelope)?);
        }
        OutputFormat::JsonPretty => {
            println!("{}", EnvelopeEncoder::new().encode_to_json(&records, insights)?);
        }
    }

    Ok(())
}

fn cmd_report(
    config: &PulseConfig,
    input: &InputArgs,
    format: OutputFormat,
    no_validate: bool,
) -> Result<(), PulseCliError> {
    let records = load_records(config, input)?;
    let report = if config.engine.validate_input && !no_validate {
        WeeklyReport::build_checked(&records)?
    } else {
        WeeklyReport::build(&records)
    };
    let report = report.ok_or(PulseCliError::NotEnoughData(records.len()))?;

    match format {
        OutputFormat::Text => {
            println!("Weekly Report");
            println!("=============");
            println!("Weekly win:  {}", report.weekly_win());
            println!("Focus area:  {}", report.focus_area());
            let arrow = match report.direction {
                TrendDirection::Up => "up",
                TrendDirection::Down => "down",
            };
            println!("Readiness:   {} ({})", report.trend_label(), arrow);
            println!();
            for point in &report.readiness_series {
                println!("  {} {:>3}", point.label, point.value);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn cmd_validate(config: &PulseConfig, input: &InputArgs, json: bool) -> Result<(), PulseCliError> {
    let records = load_records(config, input)?;
    let issues = collect_issues(&records);

    let mut invalid_indices: Vec<usize> = issues.iter().map(|i| i.index).collect();
    invalid_indices.dedup();

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - invalid_indices.len(),
        invalid_records: invalid_indices.len(),
        errors: issues
            .iter()
            .map(|issue| ValidationErrorDetail {
                index: issue.index,
                date: issue.date.to_string(),
                error: issue.error.clone(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Record {} (index {}): {}", err.date, err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(PulseCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, data: Option<&Path>, json: bool) -> Result<(), PulseCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    checks.push(match config {
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "No config file given, using defaults".to_string(),
        },
        Some(path) => match PulseConfig::load(path) {
            Ok(loaded) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid (max_records = {}, validate_input = {})",
                    loaded.source.max_records, loaded.engine.validate_input
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        },
    });

    if let Some(path) = data {
        let check = if !path.exists() {
            DoctorCheck {
                name: "data".to_string(),
                status: CheckStatus::Warning,
                message: "Data file does not exist".to_string(),
            }
        } else {
            match JsonFileSource::new(path).load_rows() {
                Ok(rows) => {
                    let source = InMemorySource::new(rows);
                    if source.is_empty() {
                        DoctorCheck {
                            name: "data".to_string(),
                            status: CheckStatus::Warning,
                            message: "Data file has no rows".to_string(),
                        }
                    } else {
                        DoctorCheck {
                            name: "data".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Data file readable ({} rows, {} users)",
                                source.len(),
                                source.user_ids().len()
                            ),
                        }
                    }
                }
                Err(e) => DoctorCheck {
                    name: "data".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            }
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass records with --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (records can be piped in)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulse Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PulseCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, PulseCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn input_format(input: &InputArgs) -> SourceFormat {
    match input.input_format {
        Some(InputFormat::Json) => SourceFormat::Json,
        Some(InputFormat::Ndjson) => SourceFormat::Ndjson,
        None => SourceFormat::from_path(&input.input),
    }
}

/// Load records newest first.
///
/// With a user id the input holds stored metric rows for any number of users;
/// without one it holds a single user's records.
fn load_records(
    config: &PulseConfig,
    input: &InputArgs,
) -> Result<Vec<HealthMetricRecord>, PulseCliError> {
    let max_records = input.max_records.unwrap_or(config.source.max_records);
    let user = input.user.as_deref().or(config.source.user_id.as_deref());
    let format = input_format(input);
    let data = read_input(&input.input)?;

    let records = match user {
        Some(user_id) => {
            let rows = match format {
                SourceFormat::Json => parse_rows(&data)?,
                SourceFormat::Ndjson => parse_rows_ndjson(&data)?,
            };
            InMemorySource::new(rows).fetch_recent_metrics(user_id, max_records)?
        }
        None => {
            let mut records = match format {
                SourceFormat::Json => parse_records(&data)?,
                SourceFormat::Ndjson => parse_records_ndjson(&data)?,
            };
            records.truncate(max_records);
            records
        }
    };

    if records.is_empty() {
        return Err(PulseCliError::NoRecords);
    }
    Ok(records)
}

fn print_insight(insight: &Insight, id: &str) {
    println!("  [{:?}] {} ({})", insight.category, insight.title, id);
    println!("    {}", insight.message);
    if let Some(chart) = &insight.chart {
        let unit = chart.unit.as_deref().unwrap_or("");
        let values: Vec<String> = chart
            .points
            .iter()
            .map(|p| format!("{} {}{}", p.label, p.value, unit))
            .collect();
        println!("    {}: {}", chart.metric.as_str(), values.join(", "));
    }
}

fn print_insights(insights: Vec<Insight>, grouped: bool) {
    let feed = InsightFeed::from_insights(insights);
    if feed.is_empty() {
        println!("No insights");
        return;
    }

    if grouped {
        for group in feed.grouped() {
            println!("{}", group.title);
            for item in &group.items {
                print_insight(&item.insight, &item.id);
            }
            println!();
        }
    } else {
        for item in feed.items() {
            print_insight(&item.insight, &item.id);
        }
    }
}

// Error types

#[derive(Debug)]
enum PulseCliError {
    Io(io::Error),
    Insight(InsightError),
    Json(serde_json::Error),
    NoRecords,
    NotEnoughData(usize),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PulseCliError {
    fn from(e: io::Error) -> Self {
        PulseCliError::Io(e)
    }
}

impl From<InsightError> for PulseCliError {
    fn from(e: InsightError) -> Self {
        PulseCliError::Insight(e)
    }
}

impl From<serde_json::Error> for PulseCliError {
    fn from(e: serde_json::Error) -> Self {
        PulseCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulseCliError> for CliError {
    fn from(e: PulseCliError) -> Self {
        match e {
            PulseCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulseCliError::Insight(InsightError::InvalidRecord(e)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'pulse validate' for details, or pass --no-validate".to_string()),
            },
            PulseCliError::Insight(InsightError::ConfigError(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'pulse doctor --config <file>' to check the file".to_string()),
            },
            PulseCliError::Insight(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Ensure input is a newest-first list of records with date, sleep_score, readiness_score, hrv and spo2"
                        .to_string(),
                ),
            },
            PulseCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulseCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No metric records found in input".to_string(),
                hint: Some("Ensure the input is not empty and --user matches a stored user".to_string()),
            },
            PulseCliError::NotEnoughData(count) => CliError {
                code: "NOT_ENOUGH_DATA".to_string(),
                message: format!("Weekly report needs 7 records, found {}", count),
                hint: Some("Sync at least a week of data".to_string()),
            },
            PulseCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            PulseCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
