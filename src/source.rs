//! Metric sources
//!
//! The engine never fetches data itself. A `MetricSource` supplies one user's
//! recent records, newest first, already filtered and truncated. This module
//! provides an in-memory source and a file-backed source that reads exported
//! metric rows as a JSON array or NDJSON.

use crate::config::DEFAULT_MAX_RECORDS;
use crate::error::InsightError;
use crate::types::HealthMetricRecord;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Trait for metric record providers
pub trait MetricSource {
    /// Fetch up to `max_count` of a user's most recent records, newest first
    fn fetch_recent_metrics(
        &self,
        user_id: &str,
        max_count: usize,
    ) -> Result<Vec<HealthMetricRecord>, InsightError>;
}

/// One stored metric row, as exported from the metrics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: String,
    #[serde(alias = "date")]
    pub metric_date: NaiveDate,
    pub sleep_score: i32,
    pub readiness_score: i32,
    pub hrv: f64,
    pub spo2: f64,
    /// Sleep stage breakdown, stored as flat `sleep_*_minutes` columns.
    /// Carried through but not read by the engine; `None` unless all four are present.
    #[serde(flatten)]
    pub sleep_stages: Option<SleepStages>,
}

/// Minutes spent in each sleep stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStages {
    #[serde(rename = "sleep_awake_minutes")]
    pub awake_minutes: u32,
    #[serde(rename = "sleep_rem_minutes")]
    pub rem_minutes: u32,
    #[serde(rename = "sleep_light_minutes")]
    pub light_minutes: u32,
    #[serde(rename = "sleep_deep_minutes")]
    pub deep_minutes: u32,
}

impl MetricRow {
    pub fn to_record(&self) -> HealthMetricRecord {
        HealthMetricRecord::new(
            self.metric_date,
            self.sleep_score,
            self.readiness_score,
            self.hrv,
            self.spo2,
        )
    }
}

/// Parse a JSON array of records
pub fn parse_records(json: &str) -> Result<Vec<HealthMetricRecord>, InsightError> {
    let records: Vec<HealthMetricRecord> = serde_json::from_str(json)?;
    Ok(records)
}

/// Parse NDJSON records, one per line
pub fn parse_records_ndjson(ndjson: &str) -> Result<Vec<HealthMetricRecord>, InsightError> {
    parse_ndjson_lines(ndjson)
}

/// Parse a JSON array of metric rows
pub fn parse_rows(json: &str) -> Result<Vec<MetricRow>, InsightError> {
    let rows: Vec<MetricRow> = serde_json::from_str(json)?;
    Ok(rows)
}

/// Parse NDJSON (newline-delimited JSON) metric rows
pub fn parse_rows_ndjson(ndjson: &str) -> Result<Vec<MetricRow>, InsightError> {
    parse_ndjson_lines(ndjson)
}

fn parse_ndjson_lines<T: DeserializeOwned>(ndjson: &str) -> Result<Vec<T>, InsightError> {
    let mut items = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(item) => items.push(item),
            Err(e) => {
                return Err(InsightError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(items)
}

/// In-memory source over stored rows
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<MetricRow>,
}

impl InMemorySource {
    pub fn new(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct user ids in first-seen order
    pub fn user_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !ids.contains(&row.user_id.as_str()) {
                ids.push(&row.user_id);
            }
        }
        ids
    }
}

impl MetricSource for InMemorySource {
    fn fetch_recent_metrics(
        &self,
        user_id: &str,
        max_count: usize,
    ) -> Result<Vec<HealthMetricRecord>, InsightError> {
        let mut records: Vec<HealthMetricRecord> = self
            .rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(MetricRow::to_record)
            .collect();

        // Newest first; stable so same-day rows keep their stored order
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(max_count);

        debug!(user_id, returned = records.len(), max_count, "fetched metrics");
        Ok(records)
    }
}

/// Layout of a metrics export file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// JSON array of rows
    Json,
    /// One row per line
    Ndjson,
}

impl SourceFormat {
    /// Guess from the file extension; anything but `.ndjson`/`.jsonl` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ndjson") | Some("jsonl") => SourceFormat::Ndjson,
            _ => SourceFormat::Json,
        }
    }
}

/// File-backed source, re-read on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    format: SourceFormat,
}

impl JsonFileSource {
    /// Create a source with the format guessed from the file extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SourceFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row in the file
    pub fn load_rows(&self) -> Result<Vec<MetricRow>, InsightError> {
        let contents = fs::read_to_string(&self.path)?;
        let rows = match self.format {
            SourceFormat::Json => parse_rows(&contents)?,
            SourceFormat::Ndjson => parse_rows_ndjson(&contents)?,
        };
        info!(path = %self.path.display(), rows = rows.len(), "loaded metric rows");
        Ok(rows)
    }
}

impl MetricSource for JsonFileSource {
    fn fetch_recent_metrics(
        &self,
        user_id: &str,
        max_count: usize,
    ) -> Result<Vec<HealthMetricRecord>, InsightError> {
        InMemorySource::new(self.load_rows()?).fetch_recent_metrics(user_id, max_count)
    }
}

/// Fetch with the default record limit
pub fn fetch_default<S: MetricSource + ?Sized>(
    source: &S,
    user_id: &str,
) -> Result<Vec<HealthMetricRecord>, InsightError> {
    source.fetch_recent_metrics(user_id, DEFAULT_MAX_RECORDS)
}
