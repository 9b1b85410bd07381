//! Weekly report
//!
//! Seven-day summary shown next to the insight feed: the best readiness day,
//! the worst sleep day, and the readiness change across the week.

use crate::error::InsightError;
use crate::rules::format_signed;
use crate::stats::RECENT_WINDOW_DAYS;
use crate::types::{ChartPoint, HealthMetricRecord};
use crate::validate::validate_records;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A notable day in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDay {
    pub date: NaiveDate,
    /// Full weekday name (e.g. "Monday")
    pub weekday: String,
    pub score: i32,
}

impl ReportDay {
    fn new(date: NaiveDate, score: i32) -> Self {
        Self {
            date,
            weekday: date.format("%A").to_string(),
            score,
        }
    }
}

/// Direction of the readiness change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

/// Seven-day summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    /// Highest readiness of the week
    pub best_readiness: ReportDay,
    /// Lowest sleep score of the week
    pub worst_sleep: ReportDay,
    /// Newest readiness minus readiness six records earlier
    pub readiness_trend: i64,
    pub direction: TrendDirection,
    /// Readiness over the week, oldest first
    pub readiness_series: Vec<ChartPoint>,
}

impl WeeklyReport {
    /// Build a report from records ordered newest first.
    ///
    /// Returns `None` when there is less than a week of records.
    pub fn build(metrics: &[HealthMetricRecord]) -> Option<Self> {
        if metrics.len() < RECENT_WINDOW_DAYS {
            return None;
        }
        let week = &metrics[..RECENT_WINDOW_DAYS];

        // Ties go to the later (older) record
        let best = week.iter().reduce(|best, current| {
            if best.readiness_score > current.readiness_score {
                best
            } else {
                current
            }
        })?;
        let worst = week.iter().reduce(|worst, current| {
            if worst.sleep_score < current.sleep_score {
                worst
            } else {
                current
            }
        })?;

        let readiness_trend = i64::from(week[0].readiness_score)
            - i64::from(week[RECENT_WINDOW_DAYS - 1].readiness_score);
        let direction = if readiness_trend >= 0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        };

        let readiness_series = week
            .iter()
            .rev()
            .map(|r| ChartPoint {
                label: r.date.format("%a").to_string(),
                value: f64::from(r.readiness_score),
            })
            .collect();

        Some(Self {
            best_readiness: ReportDay::new(best.date, best.readiness_score),
            worst_sleep: ReportDay::new(worst.date, worst.sleep_score),
            readiness_trend,
            direction,
            readiness_series,
        })
    }

    /// Validate the records, then build
    pub fn build_checked(metrics: &[HealthMetricRecord]) -> Result<Option<Self>, InsightError> {
        validate_records(metrics)?;
        Ok(Self::build(metrics))
    }

    /// Trend label, e.g. "+6%" or "-4%"
    pub fn trend_label(&self) -> String {
        format!("{}%", format_signed(self.readiness_trend))
    }

    pub fn weekly_win(&self) -> String {
        format!(
            "Peak readiness of {}% on {}.",
            self.best_readiness.score, self.best_readiness.weekday
        )
    }

    pub fn focus_area(&self) -> String {
        format!(
            "Lowest sleep score of {} on {}.",
            self.worst_sleep.score, self.worst_sleep.weekday
        )
    }
}
