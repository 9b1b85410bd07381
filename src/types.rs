//! Core types for Pulse Insights
//!
//! This module defines the data that flows through the engine: daily metric
//! records in, categorized insights out, plus the small closed vocabularies
//! (categories, metric keys, visual hints) that both sides agree on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One day of synced biometric data for a single user.
///
/// Callers supply these newest first; the engine never re-sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetricRecord {
    /// Calendar day this record describes
    #[serde(alias = "metric_date")]
    pub date: NaiveDate,
    /// Sleep score (0-100)
    pub sleep_score: i32,
    /// Readiness score (0-100)
    pub readiness_score: i32,
    /// Heart rate variability (ms)
    pub hrv: f64,
    /// Blood oxygen saturation (percentage, 0-100)
    pub spo2: f64,
}

impl HealthMetricRecord {
    pub fn new(date: NaiveDate, sleep_score: i32, readiness_score: i32, hrv: f64, spo2: f64) -> Self {
        Self {
            date,
            sleep_score,
            readiness_score,
            hrv,
            spo2,
        }
    }

    /// Read the value of one metric field
    pub fn value(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::SleepScore => f64::from(self.sleep_score),
            MetricKey::ReadinessScore => f64::from(self.readiness_score),
            MetricKey::Hrv => self.hrv,
            MetricKey::Spo2 => self.spo2,
        }
    }
}

/// Metric fields an insight can chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    SleepScore,
    ReadinessScore,
    Hrv,
    Spo2,
}

impl MetricKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::SleepScore => "sleep_score",
            MetricKey::ReadinessScore => "readiness_score",
            MetricKey::Hrv => "hrv",
            MetricKey::Spo2 => "spo2",
        }
    }

    /// Display unit appended to charted values
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            MetricKey::SleepScore => None,
            MetricKey::ReadinessScore => Some("%"),
            MetricKey::Hrv => Some("ms"),
            MetricKey::Spo2 => Some("%"),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insight category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightCategory {
    Alert,
    Recommendation,
    Observation,
    Initialization,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Alert => "Alert",
            InsightCategory::Recommendation => "Recommendation",
            InsightCategory::Observation => "Observation",
            InsightCategory::Initialization => "Initialization",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbolic tag identifying which rule produced an insight.
///
/// Renderers map these to icons; the engine knows nothing about icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintTag {
    Calibrating,
    RecoveryDrop,
    OxygenDip,
    PeakReadiness,
    SleepVariability,
    ReadinessClimb,
    Resilience,
    Sunlight,
    Hydration,
    Stable,
}

/// Semantic color class for an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintTone {
    /// Neutral/positive accent
    Primary,
    /// Negative, needs attention now
    Critical,
    /// Negative, worth watching
    Warning,
    Warm,
    Cool,
}

/// Visual hint attached to every insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualHint {
    pub tag: HintTag,
    pub tone: HintTone,
}

impl VisualHint {
    pub const fn new(tag: HintTag, tone: HintTone) -> Self {
        Self { tag, tone }
    }
}

/// A single labelled chart value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Weekday abbreviation (e.g. "Mon")
    pub label: String,
    pub value: f64,
}

/// Recent trend of one metric, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Metric field the values came from
    pub metric: MetricKey,
    /// Display unit, if the metric has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub points: Vec<ChartPoint>,
}

/// A generated, categorized, human-readable insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub title: String,
    pub message: String,
    pub hint: VisualHint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSeries>,
}

impl Insight {
    pub fn new(
        category: InsightCategory,
        title: impl Into<String>,
        message: impl Into<String>,
        hint: VisualHint,
    ) -> Self {
        Self {
            category,
            title: title.into(),
            message: message.into(),
            hint,
            chart: None,
        }
    }

    /// Attach a chart series
    pub fn with_chart(mut self, chart: ChartSeries) -> Self {
        self.chart = Some(chart);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accepts_metric_date_alias() {
        let json = r#"{
            "metric_date": "2024-01-15",
            "sleep_score": 82,
            "readiness_score": 77,
            "hrv": 61.5,
            "spo2": 97.2
        }"#;

        let record: HealthMetricRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(record.sleep_score, 82);
        assert_eq!(record.value(MetricKey::Hrv), 61.5);
        assert_eq!(record.value(MetricKey::ReadinessScore), 77.0);
    }

    #[test]
    fn test_metric_units() {
        assert_eq!(MetricKey::Hrv.unit(), Some("ms"));
        assert_eq!(MetricKey::Spo2.unit(), Some("%"));
        assert_eq!(MetricKey::ReadinessScore.unit(), Some("%"));
        assert_eq!(MetricKey::SleepScore.unit(), None);
    }

    #[test]
    fn test_insight_serialization_omits_missing_chart() {
        let insight = Insight::new(
            InsightCategory::Recommendation,
            "Tip",
            "Drink water",
            VisualHint::new(HintTag::Hydration, HintTone::Cool),
        );

        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["category"], "Recommendation");
        assert_eq!(json["hint"]["tag"], "hydration");
        assert_eq!(json["hint"]["tone"], "cool");
        assert!(json.get("chart").is_none());
    }
}
