use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::tag::TagResponse;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mood {
    pub id: String,
    pub user_id: String,
    pub rating: i64,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MoodForm {
    #[validate(range(min = 1, max = 10))]
    pub rating: i64,

    #[validate(length(max = 1000))]
    pub note: Option<String>,

    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,

    /// Tag ids to associate with the entry.
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MoodUpdateForm {
    #[validate(range(min = 1, max = 10))]
    pub rating: Option<i64>,

    #[validate(length(max = 1000))]
    pub note: Option<String>,

    /// When present, replaces the entry's tag set entirely.
    pub tags: Option<Vec<String>>,
}

/// Filters for listing a user's entries.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub id: String,
    pub rating: i64,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub tags: Vec<TagResponse>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MoodResponse {
    pub fn from_mood_and_tags(mood: Mood, tags: Vec<TagResponse>) -> Self {
        MoodResponse {
            id: mood.id,
            rating: mood.rating,
            note: mood.note,
            date: mood.date,
            tags,
            created_at: mood.created_at,
            updated_at: mood.updated_at,
        }
    }
}
