//! Insight rules
//!
//! Each rule reads the shared window statistics and yields at most one
//! insight. Rules own all numeric-to-text formatting for their messages.

use crate::stats::WindowStats;
use crate::types::{
    HealthMetricRecord, HintTag, HintTone, Insight, InsightCategory, MetricKey, VisualHint,
};

/// Minimum number of records for a full analysis
pub const MIN_RECORDS: usize = 3;

/// Today's HRV below this fraction of the weekly mean raises an alert
pub const HRV_ALERT_RATIO: f64 = 0.85;

/// SpO2 below this percentage raises an alert
pub const SPO2_ALERT_PCT: f64 = 95.0;

/// Readiness above this is a peak day
pub const PEAK_READINESS: i32 = 90;

/// Sleep score std-dev above this counts as inconsistent sleep
pub const SLEEP_STD_DEV_LIMIT: f64 = 8.0;

/// Readiness gain over the third-most-recent record that counts as a trend
pub const READINESS_TREND_POINTS: i32 = 10;

/// Readiness above this with sleep below `RESILIENCE_SLEEP` counts as resilience
pub const RESILIENCE_READINESS: i32 = 85;
pub const RESILIENCE_SLEEP: i32 = 75;

/// Below this many insights the stable fallback is added
pub const STABLE_FALLBACK_BELOW: usize = 3;

/// Round half away from zero and render as a whole number
pub fn format_whole(value: f64) -> String {
    format!("{}", value.round() as i64)
}

/// Render an integer delta with an explicit sign ("+12", "-3", "0")
pub fn format_signed(delta: i64) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

/// Placeholder emitted when there are too few records
pub fn calibrating() -> Insight {
    Insight::new(
        InsightCategory::Initialization,
        "AI Engine Calibrating",
        format!(
            "At least {MIN_RECORDS} days of data are needed for a full analysis. \
             Keep syncing your data to unlock personalized insights."
        ),
        VisualHint::new(HintTag::Calibrating, HintTone::Primary),
    )
}

/// Today's HRV well below the weekly mean
pub fn low_recovery(stats: &WindowStats<'_>) -> Option<Insight> {
    let latest = stats.latest;
    let strained = latest.hrv < stats.weekly_avg_hrv * HRV_ALERT_RATIO;
    if !strained {
        return None;
    }

    let message = format!(
        "Your HRV of {}ms is well below your weekly average of {}ms, a sign your body is under \
         significant strain. Prioritize recovery today: rest, hydrate, and keep activity light.",
        format_whole(latest.hrv),
        format_whole(stats.weekly_avg_hrv),
    );

    Some(
        Insight::new(
            InsightCategory::Alert,
            "Alert: Low Recovery State",
            message,
            VisualHint::new(HintTag::RecoveryDrop, HintTone::Critical),
        )
        .with_chart(stats.chart_series(MetricKey::Hrv)),
    )
}

/// Blood oxygen below the optimal range
pub fn low_oxygen(stats: &WindowStats<'_>) -> Option<Insight> {
    let latest = stats.latest;
    let low = latest.spo2 < SPO2_ALERT_PCT;
    if !low {
        return None;
    }

    // Whole percent like every other percentage, so readings from 94.5 show as "95%"
    let message = format!(
        "Your SpO2 of {}% is below the optimal range. A single low reading can be temporary, but \
         consistently low levels deserve attention. Keep your room well ventilated and try some \
         slow, mindful breathing.",
        format_whole(latest.spo2),
    );

    Some(
        Insight::new(
            InsightCategory::Alert,
            "Alert: Low Oxygen Saturation",
            message,
            VisualHint::new(HintTag::OxygenDip, HintTone::Warning),
        )
        .with_chart(stats.chart_series(MetricKey::Spo2)),
    )
}

/// Exceptional readiness today
pub fn peak_readiness(stats: &WindowStats<'_>) -> Option<Insight> {
    let latest = stats.latest;
    if latest.readiness_score <= PEAK_READINESS {
        return None;
    }

    let message = format!(
        "Your readiness score of {}% is exceptional. This is a good day for a challenging workout \
         or a mentally demanding task.",
        latest.readiness_score,
    );

    Some(
        Insight::new(
            InsightCategory::Recommendation,
            "Recommendation: Capitalize on Peak Readiness",
            message,
            VisualHint::new(HintTag::PeakReadiness, HintTone::Primary),
        )
        .with_chart(stats.chart_series(MetricKey::ReadinessScore)),
    )
}

/// Sleep scores varied a lot this week
pub fn sleep_consistency(stats: &WindowStats<'_>) -> Option<Insight> {
    let inconsistent = stats.sleep_std_dev > SLEEP_STD_DEV_LIMIT;
    if !inconsistent {
        return None;
    }

    Some(
        Insight::new(
            InsightCategory::Recommendation,
            "Recommendation: Improve Sleep Consistency",
            "Your sleep scores have varied significantly this week. Keeping a consistent sleep \
             schedule, weekends included, helps regulate your circadian rhythm and improves recovery.",
            VisualHint::new(HintTag::SleepVariability, HintTone::Primary),
        )
        .with_chart(stats.chart_series(MetricKey::SleepScore)),
    )
}

/// Readiness climbed against the third-most-recent record.
///
/// Compares by position, not by calendar date.
pub fn readiness_trend(stats: &WindowStats<'_>, metrics: &[HealthMetricRecord]) -> Option<Insight> {
    let baseline = metrics.get(2)?;
    // Widened so unvalidated scores cannot overflow
    let delta = i64::from(stats.latest.readiness_score) - i64::from(baseline.readiness_score);
    if delta <= i64::from(READINESS_TREND_POINTS) {
        return None;
    }

    let message = format!(
        "Your readiness is up {} points over the last 3 days. Your recent routine is having a \
         clearly positive effect on your recovery.",
        format_signed(delta),
    );

    Some(
        Insight::new(
            InsightCategory::Observation,
            "Observation: Strong Upward Trend in Readiness",
            message,
            VisualHint::new(HintTag::ReadinessClimb, HintTone::Primary),
        )
        .with_chart(stats.chart_series(MetricKey::ReadinessScore)),
    )
}

/// High readiness despite a low sleep score
pub fn resilience(stats: &WindowStats<'_>) -> Option<Insight> {
    let latest = stats.latest;
    if latest.readiness_score <= RESILIENCE_READINESS || latest.sleep_score >= RESILIENCE_SLEEP {
        return None;
    }

    let message = format!(
        "Your readiness is high ({}%) despite a lower sleep score ({}). Your body is showing \
         resilience, but watch for cognitive fatigue later in the day.",
        latest.readiness_score, latest.sleep_score,
    );

    Some(Insight::new(
        InsightCategory::Observation,
        "Observation: Resilience Under Strain",
        message,
        VisualHint::new(HintTag::Resilience, HintTone::Primary),
    ))
}

/// Static circadian tip
pub fn morning_sunlight() -> Insight {
    Insight::new(
        InsightCategory::Recommendation,
        "Wellness Tip: Morning Sunlight",
        "Getting 10-15 minutes of direct sunlight shortly after waking helps regulate your \
         circadian rhythm, which can improve sleep quality and daytime energy.",
        VisualHint::new(HintTag::Sunlight, HintTone::Warm),
    )
}

/// Static hydration tip
pub fn hydration() -> Insight {
    Insight::new(
        InsightCategory::Recommendation,
        "Hydration Reminder",
        "Good hydration supports cognitive function and physical performance. Aim for 2-3 liters \
         of water through the day, adjusting for activity level.",
        VisualHint::new(HintTag::Hydration, HintTone::Cool),
    )
}

/// Fallback when little else fired
pub fn all_stable(produced: usize) -> Option<Insight> {
    if produced >= STABLE_FALLBACK_BELOW {
        return None;
    }

    Some(Insight::new(
        InsightCategory::Observation,
        "Analysis: All Systems Stable",
        "Your key biomarkers are stable and consistent with your recent baseline. No significant \
         deviations were detected, which points to a well-balanced state. Keep it up!",
        VisualHint::new(HintTag::Stable, HintTone::Primary),
    ))
}
