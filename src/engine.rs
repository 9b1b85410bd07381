//! Insight engine
//!
//! This module provides the public API for Pulse Insights. It assembles the
//! rule outputs in a fixed order from an ordered (newest first) slice of
//! daily metric records.
//!
//! Generation is pure: no I/O, no clock, no randomness. Identical input
//! always yields identical output.

use crate::config::EngineConfig;
use crate::envelope::EnvelopeEncoder;
use crate::error::InsightError;
use crate::rules::{self, MIN_RECORDS};
use crate::source::parse_records;
use crate::stats::WindowStats;
use crate::types::{HealthMetricRecord, Insight};
use crate::validate::validate_records;
use tracing::debug;

/// Generate insights for records ordered newest first.
///
/// Fewer than three records produce a single calibration notice. Otherwise
/// every rule is evaluated and the results are returned in rule order:
/// alerts, then recommendations, then observations, then the static tips and
/// the stable fallback. The output is not re-sorted by category.
///
/// # Example
/// ```ignore
/// let insights = generate_insights(&records);
/// ```
pub fn generate_insights(metrics: &[HealthMetricRecord]) -> Vec<Insight> {
    if metrics.len() < MIN_RECORDS {
        debug!(records = metrics.len(), "not enough records, engine calibrating");
        return vec![rules::calibrating()];
    }

    let Some(stats) = WindowStats::compute(metrics) else {
        return vec![rules::calibrating()];
    };

    debug!(
        records = metrics.len(),
        window = stats.window.len(),
        weekly_avg_hrv = stats.weekly_avg_hrv,
        weekly_avg_sleep = stats.weekly_avg_sleep,
        sleep_std_dev = stats.sleep_std_dev,
        "evaluating insight rules"
    );

    let mut insights: Vec<Insight> = [
        rules::low_recovery(&stats),
        rules::low_oxygen(&stats),
        rules::peak_readiness(&stats),
        rules::sleep_consistency(&stats),
        rules::readiness_trend(&stats, metrics),
        rules::resilience(&stats),
    ]
    .into_iter()
    .flatten()
    .collect();

    let triggered = insights.len();

    insights.push(rules::morning_sunlight());
    insights.push(rules::hydration());

    if let Some(stable) = rules::all_stable(insights.len()) {
        insights.push(stable);
    }

    debug!(triggered, total = insights.len(), "insights generated");
    insights
}

/// Convert a JSON array of metric records to an insight envelope (stateless, one-shot).
///
/// Records are validated before generation.
///
/// # Arguments
/// * `records_json` - JSON array of records, newest first
///
/// # Returns
/// Insight envelope JSON
pub fn insights_to_json(records_json: String) -> Result<String, InsightError> {
    let records = parse_records(&records_json)?;
    let insights = InsightEngine::new().generate_checked(&records)?;
    EnvelopeEncoder::new().encode_to_json(&records, insights)
}

/// Insight engine with input-handling configuration.
///
/// The rules themselves are fixed; the configuration only decides whether
/// input is validated before generation.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: EngineConfig,
}

impl InsightEngine {
    /// Create an engine with default settings (validation on)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate without validating input
    pub fn generate(&self, metrics: &[HealthMetricRecord]) -> Vec<Insight> {
        generate_insights(metrics)
    }

    /// Validate input, then generate
    pub fn generate_checked(
        &self,
        metrics: &[HealthMetricRecord],
    ) -> Result<Vec<Insight>, InsightError> {
        validate_records(metrics)?;
        Ok(generate_insights(metrics))
    }

    /// Generate, validating first when the configuration asks for it
    pub fn run(&self, metrics: &[HealthMetricRecord]) -> Result<Vec<Insight>, InsightError> {
        if self.config.validate_input {
            self.generate_checked(metrics)
        } else {
            Ok(self.generate(metrics))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::InsightFeed;
    use crate::types::{HintTag, InsightCategory, MetricKey};
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn day(offset: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap() - Duration::days(offset as i64)
    }

    /// Records that trigger none of the conditional rules
    fn steady(n: usize) -> Vec<HealthMetricRecord> {
        (0..n)
            .map(|i| HealthMetricRecord::new(day(i), 80, 70, 60.0, 98.0))
            .collect()
    }

    fn tags(insights: &[Insight]) -> Vec<HintTag> {
        insights.iter().map(|i| i.hint.tag).collect()
    }

    #[test]
    fn test_short_input_calibrates() {
        for n in 0..3 {
            let insights = generate_insights(&steady(n));
            assert_eq!(insights.len(), 1);
            assert_eq!(insights[0].category, InsightCategory::Initialization);
            assert_eq!(insights[0].hint.tag, HintTag::Calibrating);
        }
    }

    #[test]
    fn test_deterministic() {
        let mut records = steady(7);
        records[0].hrv = 30.0;
        records[0].spo2 = 93.5;

        let first = generate_insights(&records);
        let second = generate_insights(&records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_low_hrv_alert_with_chart() {
        let mut records = steady(7);
        records[0].hrv = 30.0;

        let insights = generate_insights(&records);
        let alert = &insights[0];
        assert_eq!(alert.category, InsightCategory::Alert);
        assert_eq!(alert.hint.tag, HintTag::RecoveryDrop);

        let chart = alert.chart.as_ref().unwrap();
        assert_eq!(chart.metric, MetricKey::Hrv);
        assert_eq!(chart.unit.as_deref(), Some("ms"));
        let values: Vec<f64> = chart.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 30.0]);
        // Oldest point is 2024-01-09 (Tue), newest 2024-01-15 (Mon)
        assert_eq!(chart.points[0].label, "Tue");
        assert_eq!(chart.points[6].label, "Mon");
    }

    #[test]
    fn test_spo2_boundary() {
        let mut records = steady(3);
        records[0].spo2 = 95.0;
        assert!(!tags(&generate_insights(&records)).contains(&HintTag::OxygenDip));

        records[0].spo2 = 94.9;
        let insights = generate_insights(&records);
        let alert = insights
            .iter()
            .find(|i| i.hint.tag == HintTag::OxygenDip)
            .unwrap();
        assert_eq!(alert.category, InsightCategory::Alert);
        assert_eq!(alert.chart.as_ref().unwrap().metric, MetricKey::Spo2);
    }

    #[test]
    fn test_sleep_std_dev_boundary() {
        // Population std-dev exactly 8.0
        let mut records = steady(4);
        for (record, sleep) in records.iter_mut().zip([72, 88, 72, 88]) {
            record.sleep_score = sleep;
        }
        assert!(!tags(&generate_insights(&records)).contains(&HintTag::SleepVariability));

        // Population std-dev ~8.26
        records[3].sleep_score = 89;
        let insights = generate_insights(&records);
        let tip = insights
            .iter()
            .find(|i| i.hint.tag == HintTag::SleepVariability)
            .unwrap();
        let chart = tip.chart.as_ref().unwrap();
        assert_eq!(chart.metric, MetricKey::SleepScore);
        assert_eq!(chart.unit, None);
    }

    #[test]
    fn test_readiness_trend_uses_third_record() {
        let mut records = steady(5);
        for (record, readiness) in records.iter_mut().zip([95, 50, 80, 40, 40]) {
            record.readiness_score = readiness;
        }
        let insights = generate_insights(&records);
        assert!(tags(&insights).contains(&HintTag::ReadinessClimb));

        // Index 1 changing must not matter
        records[1].readiness_score = 99;
        assert!(tags(&generate_insights(&records)).contains(&HintTag::ReadinessClimb));

        // 95 - 85 = 10 is not enough
        records[2].readiness_score = 85;
        assert!(!tags(&generate_insights(&records)).contains(&HintTag::ReadinessClimb));
    }

    #[test]
    fn test_quiet_input_gets_tips_and_fallback() {
        let insights = generate_insights(&steady(7));

        assert_eq!(
            tags(&insights),
            vec![HintTag::Sunlight, HintTag::Hydration, HintTag::Stable]
        );
        assert_eq!(insights[0].category, InsightCategory::Recommendation);
        assert_eq!(insights[2].category, InsightCategory::Observation);
        assert!(insights.iter().all(|i| i.chart.is_none()));
    }

    #[test]
    fn test_fallback_skipped_when_rules_fire() {
        let mut records = steady(3);
        records[0].spo2 = 90.0;

        let insights = generate_insights(&records);
        assert_eq!(
            tags(&insights),
            vec![HintTag::OxygenDip, HintTag::Sunlight, HintTag::Hydration]
        );
    }

    #[test]
    fn test_rule_order_is_preserved() {
        let mut records = steady(7);
        records[0].hrv = 20.0;
        records[0].spo2 = 92.0;
        records[0].readiness_score = 95;
        records[0].sleep_score = 60;
        // Sleep [60, 95, 80 x5] has a population std-dev of ~9.4
        records[1].sleep_score = 95;
        records[2].readiness_score = 70;

        let insights = generate_insights(&records);
        assert_eq!(
            tags(&insights),
            vec![
                HintTag::RecoveryDrop,
                HintTag::OxygenDip,
                HintTag::PeakReadiness,
                HintTag::SleepVariability,
                HintTag::ReadinessClimb,
                HintTag::Resilience,
                HintTag::Sunlight,
                HintTag::Hydration,
            ]
        );
    }

    #[test]
    fn test_input_not_modified() {
        let mut records = steady(7);
        records[0].hrv = 25.0;
        let before = records.clone();

        generate_insights(&records);
        assert_eq!(records, before);
    }

    #[test]
    fn test_grouping_round_trip() {
        let mut records = steady(7);
        records[0].hrv = 20.0;
        records[0].readiness_score = 95;
        records[0].sleep_score = 60;

        let insights = generate_insights(&records);
        let feed = InsightFeed::from_insights(insights.clone());
        let flattened: Vec<Insight> = feed
            .grouped()
            .into_iter()
            .flat_map(|g| g.items.into_iter().map(|item| item.insight))
            .collect();

        assert_eq!(flattened.len(), insights.len());
        for insight in &insights {
            assert_eq!(flattened.iter().filter(|i| *i == insight).count(), 1);
        }
    }

    #[test]
    fn test_checked_rejects_bad_order() {
        let mut records = steady(4);
        records.reverse();

        let engine = InsightEngine::new();
        assert!(matches!(
            engine.generate_checked(&records),
            Err(InsightError::InvalidRecord(_))
        ));
        // Unchecked generation still produces output
        assert!(!engine.generate(&records).is_empty());
    }

    #[test]
    fn test_run_respects_config() {
        let mut records = steady(3);
        records[1].sleep_score = 140;

        let strict = InsightEngine::new();
        assert!(strict.run(&records).is_err());

        let lenient = InsightEngine::with_config(EngineConfig {
            validate_input: false,
        });
        assert!(lenient.run(&records).is_ok());
    }

    #[test]
    fn test_insights_to_json() {
        let json = r#"[
            {"date": "2024-01-15", "sleep_score": 80, "readiness_score": 70, "hrv": 30.0, "spo2": 98.0},
            {"date": "2024-01-14", "sleep_score": 80, "readiness_score": 70, "hrv": 60.0, "spo2": 98.0},
            {"date": "2024-01-13", "sleep_score": 80, "readiness_score": 70, "hrv": 60.0, "spo2": 98.0}
        ]"#;

        let output = insights_to_json(json.to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(payload["producer"]["name"], "pulse-insights");
        assert_eq!(payload["record_count"], 3);
        assert_eq!(payload["insights"][0]["category"], "Alert");
        assert_eq!(payload["insights"][0]["chart"]["metric"], "hrv");
    }

    #[test]
    fn test_insights_to_json_invalid() {
        assert!(insights_to_json("not valid json".to_string()).is_err());
    }
}
