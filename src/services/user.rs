use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::utils::time::current_timestamp_seconds;

pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        UserService { db }
    }

    pub async fn create_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let now = current_timestamp_seconds();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.db.pool)
        .await?;

        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Failed to create user".to_string()))
    }

    pub async fn get_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                email = COALESCE($2, email),
                updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(current_timestamp_seconds())
        .bind(id)
        .execute(&self.db.pool)
        .await?;

        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }
}
