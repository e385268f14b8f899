use chrono::NaiveDate;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{GroupWithTags, Tag, TagGroup, TagUsage};

pub struct TagService<'a> {
    db: &'a Database,
}

impl<'a> TagService<'a> {
    pub fn new(db: &'a Database) -> Self {
        TagService { db }
    }

    /// Taxonomy listing: every group with its nested tags.
    pub async fn get_groups_with_tags(&self) -> AppResult<Vec<GroupWithTags>> {
        let groups = sqlx::query_as::<_, TagGroup>("SELECT id, name FROM tag_groups")
            .fetch_all(&self.db.pool)
            .await?;

        let mut result = Vec::with_capacity(groups.len());
        for group in groups {
            let tags = sqlx::query_as::<_, Tag>(
                "SELECT id, name, icon, group_id FROM tags WHERE group_id = $1",
            )
            .bind(&group.id)
            .fetch_all(&self.db.pool)
            .await?;

            result.push(GroupWithTags {
                id: group.id,
                group_name: group.name,
                tags: tags.into_iter().map(Into::into).collect(),
            });
        }

        Ok(result)
    }

    pub async fn get_tags_for_mood(&self, mood_id: &str) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT tags.id, tags.name, tags.icon, tags.group_id
            FROM tags
            INNER JOIN mood_tags ON tags.id = mood_tags.tag_id
            WHERE mood_tags.mood_id = $1
            "#,
        )
        .bind(mood_id)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(tags)
    }

    /// The N most-used tags across a user's entries since `since`,
    /// descending by usage count. Tie order is whatever the storage
    /// returns; callers must not depend on it.
    pub async fn top_tags_for_user(
        &self,
        user_id: &str,
        since: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<TagUsage>> {
        let tags = sqlx::query_as::<_, TagUsage>(
            r#"
            SELECT tags.id, tags.name, COUNT(*) AS usage_count
            FROM mood_tags
            INNER JOIN tags ON tags.id = mood_tags.tag_id
            INNER JOIN moods ON moods.id = mood_tags.mood_id
            WHERE moods.user_id = $1 AND moods.date >= $2
            GROUP BY tags.id, tags.name
            ORDER BY usage_count DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(tags)
    }

    /// Remove a group; the schema cascades to its tags and to mood
    /// associations.
    pub async fn delete_group(&self, group_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tag_groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tag group not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{MoodForm, MoodQuery};
    use crate::services::mood::MoodService;
    use crate::services::user::UserService;
    use crate::utils::password::hash_password;
    use uuid::Uuid;

    async fn seed_user(db: &Database) -> String {
        let hash = hash_password("Sup3rSecret").unwrap();
        let id = Uuid::new_v4().to_string();
        UserService::new(db)
            .create_user(&id, "Test User", &format!("{}@example.com", id), &hash)
            .await
            .unwrap();
        id
    }

    async fn seed_group(db: &Database, name: &str, tags: &[&str]) -> (String, Vec<String>) {
        let group_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO tag_groups (id, name) VALUES ($1, $2)")
            .bind(&group_id)
            .bind(name)
            .execute(&db.pool)
            .await
            .unwrap();

        let mut tag_ids = Vec::new();
        for tag in tags {
            let tag_id = Uuid::new_v4().to_string();
            sqlx::query("INSERT INTO tags (id, name, group_id) VALUES ($1, $2, $3)")
                .bind(&tag_id)
                .bind(tag)
                .bind(&group_id)
                .execute(&db.pool)
                .await
                .unwrap();
            tag_ids.push(tag_id);
        }
        (group_id, tag_ids)
    }

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_mood(db: &Database, user_id: &str, day: u32, tags: Vec<String>) {
        MoodService::new(db)
            .create_mood(
                user_id,
                &MoodForm {
                    rating: 5,
                    note: None,
                    date: Some(date(2024, 3, day)),
                    tags: Some(tags),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_groups_with_tags_listing() {
        let db = test_database().await;
        db.seed_taxonomy().await.unwrap();

        let service = TagService::new(&db);
        let groups = service.get_groups_with_tags().await.unwrap();

        assert_eq!(groups.len(), 5);
        let activities = groups.iter().find(|g| g.group_name == "Activities").unwrap();
        assert_eq!(activities.tags.len(), 4);
    }

    #[tokio::test]
    async fn test_top_tags_ranking() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let (_, tag_ids) = seed_group(&db, "Group", &["alpha", "beta", "gamma"]).await;
        let [alpha, beta, gamma] = [&tag_ids[0], &tag_ids[1], &tag_ids[2]];

        seed_mood(&db, &user_id, 1, vec![alpha.clone(), beta.clone()]).await;
        seed_mood(&db, &user_id, 2, vec![alpha.clone(), gamma.clone()]).await;
        seed_mood(&db, &user_id, 3, vec![alpha.clone(), beta.clone()]).await;

        let service = TagService::new(&db);
        let top = service
            .top_tags_for_user(&user_id, date(2024, 1, 1), 2)
            .await
            .unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "alpha");
        assert_eq!(top[0].usage_count, 3);
        assert_eq!(top[1].name, "beta");
        assert_eq!(top[1].usage_count, 2);
    }

    #[tokio::test]
    async fn test_top_tags_respects_window() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let (_, tag_ids) = seed_group(&db, "Group", &["old", "new"]).await;

        seed_mood(&db, &user_id, 1, vec![tag_ids[0].clone()]).await;
        seed_mood(&db, &user_id, 20, vec![tag_ids[1].clone()]).await;

        let service = TagService::new(&db);
        let top = service
            .top_tags_for_user(&user_id, date(2024, 3, 10), 5)
            .await
            .unwrap();

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "new");
    }

    #[tokio::test]
    async fn test_delete_group_cascades() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let (group_id, tag_ids) = seed_group(&db, "Doomed", &["a", "b"]).await;
        seed_mood(&db, &user_id, 1, tag_ids.clone()).await;

        let service = TagService::new(&db);
        service.delete_group(&group_id).await.unwrap();

        // Tags unreachable through the taxonomy
        assert!(service.get_groups_with_tags().await.unwrap().is_empty());

        // Associations removed, not orphaned
        let mood = MoodService::new(&db)
            .find_by_user(&user_id, &MoodQuery::default())
            .await
            .unwrap()
            .remove(0);
        assert!(service.get_tags_for_mood(&mood.id).await.unwrap().is_empty());

        // Deleting again is NotFound
        assert!(matches!(
            service.delete_group(&group_id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
