use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub group_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TagGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub group_id: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        TagResponse {
            id: tag.id,
            name: tag.name,
            icon: tag.icon,
            group_id: tag.group_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupWithTags {
    pub id: String,
    pub group_name: String,
    pub tags: Vec<TagResponse>,
}

/// One row of the top-tags ranking join.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagUsage {
    pub id: String,
    pub name: String,
    pub usage_count: i64,
}
