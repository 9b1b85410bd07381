//! Insight envelope encoding
//!
//! This module wraps engine output with producer metadata and a computation
//! timestamp for transport. The clock and instance ids live here so the
//! engine itself stays deterministic.

use crate::error::InsightError;
use crate::types::{HealthMetricRecord, Insight};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Engine output plus provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightEnvelope {
    pub producer: Producer,
    pub computed_at_utc: String,
    /// Number of records the engine was given
    pub record_count: usize,
    /// Date of the most recent record, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_date: Option<NaiveDate>,
    pub insights: Vec<Insight>,
}

/// Encoder for insight envelopes
pub struct EnvelopeEncoder {
    instance_id: String,
}

impl Default for EnvelopeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap insights generated from `records`
    pub fn encode(&self, records: &[HealthMetricRecord], insights: Vec<Insight>) -> InsightEnvelope {
        InsightEnvelope {
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            record_count: records.len(),
            latest_date: records.first().map(|r| r.date),
            insights,
        }
    }

    /// Encode to pretty JSON
    pub fn encode_to_json(
        &self,
        records: &[HealthMetricRecord],
        insights: Vec<Insight>,
    ) -> Result<String, InsightError> {
        let envelope = self.encode(records, insights);
        serde_json::to_string_pretty(&envelope).map_err(|e| InsightError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::generate_insights;

    fn records() -> Vec<HealthMetricRecord> {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        (0..3)
            .map(|i| HealthMetricRecord::new(today - chrono::Duration::days(i), 80, 70, 60.0, 98.0))
            .collect()
    }

    #[test]
    fn test_encode_metadata() {
        let records = records();
        let encoder = EnvelopeEncoder::with_instance_id("test-instance");
        let envelope = encoder.encode(&records, generate_insights(&records));

        assert_eq!(envelope.producer.name, PRODUCER_NAME);
        assert_eq!(envelope.producer.version, ENGINE_VERSION);
        assert_eq!(envelope.producer.instance_id, "test-instance");
        assert_eq!(envelope.record_count, 3);
        assert_eq!(envelope.latest_date, NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(envelope.insights.len(), 3);
        assert!(!envelope.computed_at_utc.is_empty());
    }

    #[test]
    fn test_instance_ids_are_unique() {
        assert_ne!(
            EnvelopeEncoder::new().instance_id(),
            EnvelopeEncoder::new().instance_id()
        );
    }

    #[test]
    fn test_empty_records_omit_latest_date() {
        let encoder = EnvelopeEncoder::new();
        let json = encoder.encode_to_json(&[], generate_insights(&[])).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(payload.get("latest_date").is_none());
        assert_eq!(payload["insights"][0]["category"], "Initialization");
    }
}
