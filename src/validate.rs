//! Metric record validation
//!
//! The engine trusts its input. These checks let a caller fail fast on
//! malformed records (out-of-range scores, non-finite readings, dates that
//! are not strictly newest first) before they reach the rules.

use crate::types::HealthMetricRecord;
use chrono::NaiveDate;
use serde::Serialize;

/// Valid range for sleep and readiness scores
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

/// Valid range for SpO2 readings (percentage)
pub const SPO2_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Validation errors for metric records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("record {index}: {field} = {value} is outside 0-100")]
    ScoreOutOfRange {
        index: usize,
        field: &'static str,
        value: i32,
    },

    #[error("record {index}: {field} = {value} is not a valid reading")]
    InvalidReading {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("record {index}: date {date} appears more than once")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("record {index}: date {current} is newer than the preceding {previous}; records must be newest first")]
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
}

impl ValidationError {
    /// Index of the offending record
    pub fn index(&self) -> usize {
        match self {
            ValidationError::ScoreOutOfRange { index, .. }
            | ValidationError::InvalidReading { index, .. }
            | ValidationError::DuplicateDate { index, .. }
            | ValidationError::OutOfOrder { index, .. } => *index,
        }
    }
}

/// One problem found by `collect_issues`
#[derive(Debug, Clone, Serialize)]
pub struct RecordIssue {
    pub index: usize,
    pub date: NaiveDate,
    pub error: String,
}

/// Check a single record's fields
pub fn validate_record(index: usize, record: &HealthMetricRecord) -> Result<(), ValidationError> {
    field_errors(index, record).into_iter().next().map_or(Ok(()), Err)
}

/// Check every record and the newest-first ordering; stops at the first problem
pub fn validate_records(records: &[HealthMetricRecord]) -> Result<(), ValidationError> {
    for (index, record) in records.iter().enumerate() {
        validate_record(index, record)?;
        if index > 0 {
            check_order(index, &records[index - 1], record)?;
        }
    }
    Ok(())
}

/// Collect every problem instead of stopping at the first
pub fn collect_issues(records: &[HealthMetricRecord]) -> Vec<RecordIssue> {
    let mut issues = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let mut errors = field_errors(index, record);
        if index > 0 {
            if let Err(e) = check_order(index, &records[index - 1], record) {
                errors.push(e);
            }
        }

        issues.extend(errors.into_iter().map(|e| RecordIssue {
            index,
            date: record.date,
            error: e.to_string(),
        }));
    }

    issues
}

fn field_errors(index: usize, record: &HealthMetricRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("sleep_score", record.sleep_score),
        ("readiness_score", record.readiness_score),
    ] {
        if !SCORE_RANGE.contains(&value) {
            errors.push(ValidationError::ScoreOutOfRange { index, field, value });
        }
    }

    if !record.hrv.is_finite() || record.hrv < 0.0 {
        errors.push(ValidationError::InvalidReading {
            index,
            field: "hrv",
            value: record.hrv,
        });
    }

    if !record.spo2.is_finite() || !SPO2_RANGE.contains(&record.spo2) {
        errors.push(ValidationError::InvalidReading {
            index,
            field: "spo2",
            value: record.spo2,
        });
    }

    errors
}

fn check_order(
    index: usize,
    previous: &HealthMetricRecord,
    current: &HealthMetricRecord,
) -> Result<(), ValidationError> {
    if current.date == previous.date {
        return Err(ValidationError::DuplicateDate {
            index,
            date: current.date,
        });
    }
    if current.date > previous.date {
        return Err(ValidationError::OutOfOrder {
            index,
            previous: previous.date,
            current: current.date,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap() - Duration::days(offset)
    }

    fn record(offset: i64) -> HealthMetricRecord {
        HealthMetricRecord::new(day(offset), 80, 75, 55.0, 97.0)
    }

    #[test]
    fn test_valid_records() {
        let records = vec![record(0), record(1), record(3)];
        assert!(validate_records(&records).is_ok());
        assert!(collect_issues(&records).is_empty());
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(validate_records(&[]).is_ok());
    }

    #[test]
    fn test_score_out_of_range() {
        let mut bad = record(0);
        bad.readiness_score = 101;

        let err = validate_record(4, &bad).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ScoreOutOfRange {
                index: 4,
                field: "readiness_score",
                value: 101
            }
        );
        assert_eq!(err.index(), 4);
    }

    #[test]
    fn test_non_finite_and_negative_readings() {
        let mut bad = record(0);
        bad.hrv = f64::NAN;
        assert!(matches!(
            validate_record(0, &bad),
            Err(ValidationError::InvalidReading { field: "hrv", .. })
        ));

        let mut bad = record(0);
        bad.hrv = -1.0;
        assert!(validate_record(0, &bad).is_err());

        let mut bad = record(0);
        bad.spo2 = 100.5;
        assert!(matches!(
            validate_record(0, &bad),
            Err(ValidationError::InvalidReading { field: "spo2", .. })
        ));
    }

    #[test]
    fn test_zero_hrv_is_allowed() {
        let mut zero = record(0);
        zero.hrv = 0.0;
        assert!(validate_record(0, &zero).is_ok());
    }

    #[test]
    fn test_spo2_range_bounds() {
        for spo2 in [0.0, 100.0] {
            let mut edge = record(0);
            edge.spo2 = spo2;
            assert!(validate_record(0, &edge).is_ok());
        }

        let mut bad = record(0);
        bad.spo2 = -0.1;
        assert!(validate_record(0, &bad).is_err());
    }

    #[test]
    fn test_ordering() {
        let oldest_first = vec![record(2), record(1), record(0)];
        assert!(matches!(
            validate_records(&oldest_first),
            Err(ValidationError::OutOfOrder { index: 1, .. })
        ));

        let duplicated = vec![record(0), record(0)];
        assert!(matches!(
            validate_records(&duplicated),
            Err(ValidationError::DuplicateDate { index: 1, .. })
        ));
    }

    #[test]
    fn test_collect_issues_reports_everything() {
        let mut first = record(0);
        first.sleep_score = -5;
        first.spo2 = f64::INFINITY;
        let records = vec![first, record(0)];

        let issues = collect_issues(&records);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].index, 0);
        assert_eq!(issues[2].index, 1);
        assert!(issues[2].error.contains("more than once"));
    }
}
