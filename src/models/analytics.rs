use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;

use crate::models::tag::TagUsage;

/// Bucket size for trend aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// The projection of an entry the analytics engine consumes.
#[derive(Debug, Clone, FromRow)]
pub struct MoodPoint {
    pub rating: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBucket {
    pub period: String,
    pub average: f64,
    pub entries: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_entries: i64,
    pub average_mood: f64,
    pub mood_distribution: BTreeMap<i64, i64>,
    pub mood_trend: Vec<TrendBucket>,
    pub best_day: Option<NaiveDate>,
    pub worst_day: Option<NaiveDate>,
    pub top_tags: Vec<TagUsage>,
}

impl AnalyticsSummary {
    pub fn empty() -> Self {
        AnalyticsSummary {
            total_entries: 0,
            average_mood: 0.0,
            mood_distribution: BTreeMap::new(),
            mood_trend: Vec::new(),
            best_day: None,
            worst_day: None,
            top_tags: Vec::new(),
        }
    }
}
