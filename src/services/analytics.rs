use chrono::{Duration, Months, NaiveDate};
use std::collections::BTreeMap;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{AnalyticsSummary, Granularity, MoodPoint, TrendBucket};
use crate::models::tag::TagUsage;
use crate::services::tag::TagService;
use crate::utils::dates::{day_key, month_key, resolve_range, week_key, year_key};
use crate::utils::time::today;

pub struct AnalyticsService<'a> {
    db: &'a Database,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(db: &'a Database) -> Self {
        AnalyticsService { db }
    }

    /// Summary over the window described by a trailing-days range token.
    /// Unrecognized tokens fall back to the 30-day default window.
    pub async fn get_analytics(
        &self,
        user_id: &str,
        range: &str,
        top_tags_limit: i64,
    ) -> AppResult<AnalyticsSummary> {
        let since = resolve_range(range, today());

        let points = self.fetch_points(user_id, Some(since)).await?;
        let top_tags = TagService::new(self.db)
            .top_tags_for_user(user_id, since, top_tags_limit)
            .await?;

        Ok(summarize(&points, top_tags))
    }

    /// Trend buckets for a named period token. Periods are strict: anything
    /// other than week/month/year is an invalid argument, not a default.
    pub async fn get_trends(&self, user_id: &str, period: &str) -> AppResult<Vec<TrendBucket>> {
        let (since, granularity) = match period {
            "week" => (Some(today() - Duration::days(28)), Granularity::Daily),
            "month" => (today().checked_sub_months(Months::new(6)), Granularity::Monthly),
            "year" => (None, Granularity::Yearly),
            _ => {
                return Err(AppError::InvalidArgument(
                    "Invalid period. Use: week, month, or year".to_string(),
                ))
            }
        };

        let points = self.fetch_points(user_id, since).await?;
        Ok(bucket_entries(&points, granularity))
    }

    async fn fetch_points(
        &self,
        user_id: &str,
        since: Option<NaiveDate>,
    ) -> AppResult<Vec<MoodPoint>> {
        let points = match since {
            Some(since) => {
                sqlx::query_as::<_, MoodPoint>(
                    r#"
                    SELECT rating, date FROM moods
                    WHERE user_id = $1 AND date >= $2
                    ORDER BY date ASC
                    "#,
                )
                .bind(user_id)
                .bind(since)
                .fetch_all(&self.db.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MoodPoint>(
                    r#"
                    SELECT rating, date FROM moods
                    WHERE user_id = $1
                    ORDER BY date ASC
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.db.pool)
                .await?
            }
        };

        Ok(points)
    }
}

/// Compute the analytics summary from entries ordered ascending by date.
pub fn summarize(points: &[MoodPoint], top_tags: Vec<TagUsage>) -> AnalyticsSummary {
    // Short-circuit before the division below.
    if points.is_empty() {
        let mut summary = AnalyticsSummary::empty();
        summary.top_tags = top_tags;
        return summary;
    }

    let total_entries = points.len() as i64;
    let sum: i64 = points.iter().map(|p| p.rating).sum();
    let average_mood = round2(sum as f64 / total_entries as f64);

    let mut mood_distribution: BTreeMap<i64, i64> = BTreeMap::new();
    for point in points {
        *mood_distribution.entry(point.rating).or_insert(0) += 1;
    }

    // Strict comparisons keep the earliest date on ties.
    let mut best: Option<(i64, NaiveDate)> = None;
    let mut worst: Option<(i64, NaiveDate)> = None;
    for point in points {
        if best.map_or(true, |(rating, _)| point.rating > rating) {
            best = Some((point.rating, point.date));
        }
        if worst.map_or(true, |(rating, _)| point.rating < rating) {
            worst = Some((point.rating, point.date));
        }
    }

    AnalyticsSummary {
        total_entries,
        average_mood,
        mood_distribution,
        mood_trend: bucket_entries(points, Granularity::Weekly),
        best_day: best.map(|(_, date)| date),
        worst_day: worst.map(|(_, date)| date),
        top_tags,
    }
}

/// Group entries into non-overlapping trend buckets. Input is ordered
/// ascending by date, so first-occurrence order is chronological order.
pub fn bucket_entries(points: &[MoodPoint], granularity: Granularity) -> Vec<TrendBucket> {
    let mut buckets: Vec<(String, i64, i64)> = Vec::new();

    for point in points {
        let key = bucket_key(point.date, granularity);
        match buckets.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, sum, count)) => {
                *sum += point.rating;
                *count += 1;
            }
            None => buckets.push((key, point.rating, 1)),
        }
    }

    buckets
        .into_iter()
        .map(|(period, sum, count)| TrendBucket {
            period,
            average: round2(sum as f64 / count as f64),
            entries: count,
        })
        .collect()
}

fn bucket_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => day_key(date),
        Granularity::Weekly => week_key(date),
        Granularity::Monthly => month_key(date),
        Granularity::Yearly => year_key(date),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
