use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{Mood, MoodForm, MoodQuery, MoodUpdateForm};
use crate::utils::time::{current_timestamp_seconds, today};

pub struct MoodService<'a> {
    db: &'a Database,
}

impl<'a> MoodService<'a> {
    pub fn new(db: &'a Database) -> Self {
        MoodService { db }
    }

    /// Create an entry together with its tag associations. The UNIQUE
    /// (user_id, date) constraint is the arbiter for concurrent creates;
    /// the loser surfaces as Conflict.
    pub async fn create_mood(&self, user_id: &str, form: &MoodForm) -> AppResult<Mood> {
        let id = Uuid::new_v4().to_string();
        let date = form.date.unwrap_or_else(today);
        let now = current_timestamp_seconds();

        let mut tx = self.db.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO moods (id, user_id, rating, note, date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(form.rating)
        .bind(&form.note)
        .bind(date)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(tags) = &form.tags {
            for tag_id in tags {
                sqlx::query("INSERT INTO mood_tags (mood_id, tag_id) VALUES ($1, $2)")
                    .bind(&id)
                    .bind(tag_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get_mood_by_id(&id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Failed to create mood entry".to_string()))
    }

    pub async fn get_mood_by_id(&self, id: &str) -> AppResult<Option<Mood>> {
        let mood = sqlx::query_as::<_, Mood>(
            r#"
            SELECT id, user_id, rating, note, date, created_at, updated_at
            FROM moods
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(mood)
    }

    pub async fn find_by_user(&self, user_id: &str, query: &MoodQuery) -> AppResult<Vec<Mood>> {
        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, user_id, rating, note, date, created_at, updated_at FROM moods WHERE user_id = ",
        );
        qb.push_bind(user_id);

        if let Some(start) = query.start_date {
            qb.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = query.end_date {
            qb.push(" AND date <= ").push_bind(end);
        }

        qb.push(" ORDER BY date DESC");

        if query.limit.is_some() || query.offset.is_some() {
            // SQLite requires a LIMIT clause before OFFSET; -1 means unbounded.
            qb.push(" LIMIT ").push_bind(query.limit.unwrap_or(-1));
            if let Some(offset) = query.offset {
                qb.push(" OFFSET ").push_bind(offset);
            }
        }

        let moods = qb
            .build_query_as::<Mood>()
            .fetch_all(&self.db.pool)
            .await?;

        Ok(moods)
    }

    /// Update an entry. A present tag list replaces the association set
    /// entirely (delete-then-reinsert) in the same transaction as the row
    /// update; the date of an entry is immutable.
    pub async fn update_mood(&self, id: &str, form: &MoodUpdateForm) -> AppResult<Mood> {
        let now = current_timestamp_seconds();

        let mut tx = self.db.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE moods
            SET rating = COALESCE($1, rating),
                note = COALESCE($2, note),
                updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(form.rating)
        .bind(&form.note)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(tags) = &form.tags {
            sqlx::query("DELETE FROM mood_tags WHERE mood_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for tag_id in tags {
                sqlx::query("INSERT INTO mood_tags (mood_id, tag_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(tag_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get_mood_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Mood entry not found".to_string()))
    }

    pub async fn delete_mood(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM moods WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::services::tag::TagService;
    use crate::services::user::UserService;
    use crate::utils::password::hash_password;
    use chrono::NaiveDate;

    async fn seed_user(db: &Database) -> String {
        let hash = hash_password("Sup3rSecret").unwrap();
        let id = Uuid::new_v4().to_string();
        UserService::new(db)
            .create_user(&id, "Test User", &format!("{}@example.com", id), &hash)
            .await
            .unwrap();
        id
    }

    async fn seed_tag(db: &Database, name: &str) -> String {
        let group_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO tag_groups (id, name) VALUES ($1, $2)")
            .bind(&group_id)
            .bind("Group")
            .execute(&db.pool)
            .await
            .unwrap();

        let tag_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO tags (id, name, group_id) VALUES ($1, $2, $3)")
            .bind(&tag_id)
            .bind(name)
            .bind(&group_id)
            .execute(&db.pool)
            .await
            .unwrap();
        tag_id
    }

    fn form(rating: i64, date: NaiveDate, tags: Option<Vec<String>>) -> MoodForm {
        MoodForm {
            rating,
            note: None,
            date: Some(date),
            tags,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_date_conflicts_and_keeps_first_entry() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let service = MoodService::new(&db);

        let first = service
            .create_mood(&user_id, &form(7, date(2024, 3, 1), None))
            .await
            .unwrap();

        let err = service
            .create_mood(&user_id, &form(2, date(2024, 3, 1), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let kept = service.get_mood_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(kept.rating, 7);
    }

    #[tokio::test]
    async fn test_same_date_different_users_is_allowed() {
        let db = test_database().await;
        let user_a = seed_user(&db).await;
        let user_b = seed_user(&db).await;
        let service = MoodService::new(&db);

        service
            .create_mood(&user_a, &form(5, date(2024, 3, 1), None))
            .await
            .unwrap();
        service
            .create_mood(&user_b, &form(5, date(2024, 3, 1), None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_tag_replacement_is_exact() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let service = MoodService::new(&db);
        let tag_service = TagService::new(&db);

        let tag_a = seed_tag(&db, "A").await;
        let tag_b = seed_tag(&db, "B").await;
        let tag_c = seed_tag(&db, "C").await;

        let mood = service
            .create_mood(
                &user_id,
                &form(6, date(2024, 3, 1), Some(vec![tag_a, tag_b])),
            )
            .await
            .unwrap();
        assert_eq!(tag_service.get_tags_for_mood(&mood.id).await.unwrap().len(), 2);

        service
            .update_mood(
                &mood.id,
                &MoodUpdateForm {
                    rating: None,
                    note: None,
                    tags: Some(vec![tag_c.clone()]),
                },
            )
            .await
            .unwrap();

        let tags = tag_service.get_tags_for_mood(&mood.id).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, tag_c);
    }

    #[tokio::test]
    async fn test_update_without_tags_leaves_associations() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let service = MoodService::new(&db);
        let tag_service = TagService::new(&db);

        let tag_a = seed_tag(&db, "A").await;
        let mood = service
            .create_mood(&user_id, &form(6, date(2024, 3, 1), Some(vec![tag_a])))
            .await
            .unwrap();

        let updated = service
            .update_mood(
                &mood.id,
                &MoodUpdateForm {
                    rating: Some(9),
                    note: Some("better".to_string()),
                    tags: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.rating, 9);
        assert_eq!(updated.note.as_deref(), Some("better"));
        assert_eq!(tag_service.get_tags_for_mood(&mood.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_user_filters_and_orders() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let service = MoodService::new(&db);

        for (rating, day) in [(3, 1), (5, 2), (8, 3), (2, 4)] {
            service
                .create_mood(&user_id, &form(rating, date(2024, 3, day), None))
                .await
                .unwrap();
        }

        let all = service
            .find_by_user(&user_id, &MoodQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
        // Descending by date
        assert_eq!(all[0].date, date(2024, 3, 4));

        let windowed = service
            .find_by_user(
                &user_id,
                &MoodQuery {
                    start_date: Some(date(2024, 3, 2)),
                    end_date: Some(date(2024, 3, 3)),
                    limit: None,
                    offset: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(windowed.len(), 2);

        let paged = service
            .find_by_user(
                &user_id,
                &MoodQuery {
                    start_date: None,
                    end_date: None,
                    limit: Some(2),
                    offset: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(paged.len(), 2);
        assert_eq!(paged[0].date, date(2024, 3, 3));
    }

    #[tokio::test]
    async fn test_delete_mood_removes_associations() {
        let db = test_database().await;
        let user_id = seed_user(&db).await;
        let service = MoodService::new(&db);
        let tag_service = TagService::new(&db);

        let tag_a = seed_tag(&db, "A").await;
        let mood = service
            .create_mood(&user_id, &form(6, date(2024, 3, 1), Some(vec![tag_a])))
            .await
            .unwrap();

        service.delete_mood(&mood.id).await.unwrap();

        assert!(service.get_mood_by_id(&mood.id).await.unwrap().is_none());
        assert!(tag_service.get_tags_for_mood(&mood.id).await.unwrap().is_empty());
    }
}
