//! Window statistics
//!
//! This module computes the statistics every rule reads from: the latest
//! record, the recent window (up to a week, newest first), weekly averages,
//! sleep variability, and oldest-first chart series.

use crate::types::{ChartPoint, ChartSeries, HealthMetricRecord, MetricKey};

/// Number of records in the recent window
pub const RECENT_WINDOW_DAYS: usize = 7;

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N); 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Statistics over the most recent records, shared by all rules
#[derive(Debug, Clone)]
pub struct WindowStats<'a> {
    /// Most recent record
    pub latest: &'a HealthMetricRecord,
    /// Up to `RECENT_WINDOW_DAYS` records, newest first
    pub window: &'a [HealthMetricRecord],
    /// Mean HRV over the window (ms)
    pub weekly_avg_hrv: f64,
    /// Mean sleep score over the window
    pub weekly_avg_sleep: f64,
    /// Population standard deviation of sleep score over the window
    pub sleep_std_dev: f64,
}

impl<'a> WindowStats<'a> {
    /// Compute window statistics; `None` when there are no records
    pub fn compute(metrics: &'a [HealthMetricRecord]) -> Option<Self> {
        let latest = metrics.first()?;
        let window = &metrics[..metrics.len().min(RECENT_WINDOW_DAYS)];

        let hrv = Self::values(window, MetricKey::Hrv);
        let sleep = Self::values(window, MetricKey::SleepScore);

        Some(Self {
            latest,
            window,
            weekly_avg_hrv: mean(&hrv),
            weekly_avg_sleep: mean(&sleep),
            sleep_std_dev: population_std_dev(&sleep),
        })
    }

    /// Chart series for one metric over the window, oldest first
    pub fn chart_series(&self, metric: MetricKey) -> ChartSeries {
        let points = self
            .window
            .iter()
            .rev()
            .map(|record| ChartPoint {
                label: record.date.format("%a").to_string(),
                value: record.value(metric),
            })
            .collect();

        ChartSeries {
            metric,
            unit: metric.unit().map(str::to_string),
            points,
        }
    }

    fn values(window: &[HealthMetricRecord], metric: MetricKey) -> Vec<f64> {
        window.iter().map(|record| record.value(metric)).collect()
    }
}
