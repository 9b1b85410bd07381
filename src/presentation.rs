//! Insight feed presentation
//!
//! Local view state over one engine result: presentation ids, dismissals,
//! category grouping in a fixed section order, and the chart detail view.
//! Nothing here calls back into the engine.

use crate::types::{ChartSeries, Insight, InsightCategory};
use serde::Serialize;

/// Section order used when grouping
pub const CATEGORY_ORDER: [InsightCategory; 4] = [
    InsightCategory::Alert,
    InsightCategory::Recommendation,
    InsightCategory::Observation,
    InsightCategory::Initialization,
];

/// Fixed section order
pub fn category_order() -> &'static [InsightCategory] {
    &CATEGORY_ORDER
}

/// Section heading for a category
pub fn section_title(category: InsightCategory) -> &'static str {
    match category {
        InsightCategory::Alert => "Critical Alerts",
        InsightCategory::Recommendation => "AI Recommendations",
        InsightCategory::Observation => "Key Observations",
        InsightCategory::Initialization => "System Status",
    }
}

/// An insight with its presentation id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub insight: Insight,
}

/// One non-empty category section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightGroup {
    pub category: InsightCategory,
    pub title: &'static str,
    pub items: Vec<FeedItem>,
}

/// A charted value with its display label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPoint {
    pub label: String,
    pub value: f64,
    /// Value with unit suffix, e.g. "54ms"
    pub display: String,
}

/// Detail view for a charted insight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightDetail {
    pub title: String,
    pub message: String,
    pub points: Vec<DetailPoint>,
}

impl InsightDetail {
    fn from_chart(insight: &Insight, chart: &ChartSeries) -> Self {
        let unit = chart.unit.as_deref().unwrap_or("");
        let points = chart
            .points
            .iter()
            .map(|p| DetailPoint {
                label: p.label.clone(),
                value: p.value,
                display: format!("{}{}", p.value, unit),
            })
            .collect();

        Self {
            title: insight.title.clone(),
            message: insight.message.clone(),
            points,
        }
    }
}

/// Visible insights for one page view
#[derive(Debug, Clone, Default)]
pub struct InsightFeed {
    items: Vec<FeedItem>,
}

impl InsightFeed {
    /// Assign ids of the form `"{title}-{index}"` in engine order
    pub fn from_insights(insights: Vec<Insight>) -> Self {
        let items = insights
            .into_iter()
            .enumerate()
            .map(|(index, insight)| FeedItem {
                id: format!("{}-{}", insight.title, index),
                insight,
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FeedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Hide an insight; returns false if the id is not visible
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Group visible insights by category in `CATEGORY_ORDER`, skipping empty sections
    pub fn grouped(&self) -> Vec<InsightGroup> {
        CATEGORY_ORDER
            .iter()
            .filter_map(|&category| {
                let items: Vec<FeedItem> = self
                    .items
                    .iter()
                    .filter(|item| item.insight.category == category)
                    .cloned()
                    .collect();
                (!items.is_empty()).then(|| InsightGroup {
                    category,
                    title: section_title(category),
                    items,
                })
            })
            .collect()
    }

    /// Detail view; only insights with a chart have one
    pub fn detail(&self, id: &str) -> Option<InsightDetail> {
        let item = self.get(id)?;
        let chart = item.insight.chart.as_ref()?;
        Some(InsightDetail::from_chart(&item.insight, chart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartPoint, HintTag, HintTone, MetricKey, VisualHint};
    use pretty_assertions::assert_eq;

    fn insight(category: InsightCategory, title: &str) -> Insight {
        Insight::new(
            category,
            title,
            "message",
            VisualHint::new(HintTag::Stable, HintTone::Primary),
        )
    }

    fn charted(title: &str) -> Insight {
        insight(InsightCategory::Alert, title).with_chart(ChartSeries {
            metric: MetricKey::Hrv,
            unit: Some("ms".to_string()),
            points: vec![
                ChartPoint {
                    label: "Sun".to_string(),
                    value: 60.0,
                },
                ChartPoint {
                    label: "Mon".to_string(),
                    value: 42.5,
                },
            ],
        })
    }

    fn sample_feed() -> InsightFeed {
        InsightFeed::from_insights(vec![
            insight(InsightCategory::Observation, "Trend"),
            charted("Low HRV"),
            insight(InsightCategory::Recommendation, "Sunlight"),
            insight(InsightCategory::Recommendation, "Water"),
        ])
    }

    #[test]
    fn test_ids_use_title_and_index() {
        let feed = sample_feed();
        let ids: Vec<&str> = feed.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["Trend-0", "Low HRV-1", "Sunlight-2", "Water-3"]);
    }

    #[test]
    fn test_grouped_order_and_titles() {
        let groups = sample_feed().grouped();

        let sections: Vec<(InsightCategory, &str, usize)> = groups
            .iter()
            .map(|g| (g.category, g.title, g.items.len()))
            .collect();
        assert_eq!(
            sections,
            vec![
                (InsightCategory::Alert, "Critical Alerts", 1),
                (InsightCategory::Recommendation, "AI Recommendations", 2),
                (InsightCategory::Observation, "Key Observations", 1),
            ]
        );
        // Engine order is kept inside a section
        assert_eq!(groups[1].items[0].id, "Sunlight-2");
    }

    #[test]
    fn test_dismiss() {
        let mut feed = sample_feed();
        assert!(feed.dismiss("Sunlight-2"));
        assert!(!feed.dismiss("Sunlight-2"));
        assert_eq!(feed.len(), 3);

        // Ids are not reassigned after a dismissal
        assert!(feed.get("Water-3").is_some());

        assert!(feed.dismiss("Low HRV-1"));
        assert!(feed
            .grouped()
            .iter()
            .all(|g| g.category != InsightCategory::Alert));
    }

    #[test]
    fn test_detail_only_for_charted() {
        let feed = sample_feed();
        assert!(feed.detail("Trend-0").is_none());
        assert!(feed.detail("missing").is_none());

        let detail = feed.detail("Low HRV-1").unwrap();
        assert_eq!(detail.title, "Low HRV");
        let displays: Vec<&str> = detail.points.iter().map(|p| p.display.as_str()).collect();
        assert_eq!(displays, vec!["60ms", "42.5ms"]);
    }

    #[test]
    fn test_empty_feed() {
        let mut feed = InsightFeed::from_insights(Vec::new());
        assert!(feed.is_empty());
        assert!(feed.grouped().is_empty());
        assert!(!feed.dismiss("Trend-0"));
    }

    #[test]
    fn test_category_order() {
        assert_eq!(category_order().len(), 4);
        assert_eq!(category_order()[0], InsightCategory::Alert);
        assert_eq!(category_order()[3], InsightCategory::Initialization);
    }
}
