use uuid::Uuid;

use crate::db::Database;
use crate::error::AppResult;
use crate::models::{RefreshToken, User};
use crate::services::user::UserService;
use crate::utils::password::verify_password;
use crate::utils::time::current_timestamp_seconds;

pub struct AuthService<'a> {
    db: &'a Database,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Database) -> Self {
        AuthService { db }
    }

    /// Verify credentials; `None` means unknown email or wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let user = UserService::new(self.db).get_user_by_email(email).await?;

        if let Some(user) = user {
            if verify_password(password, &user.password)? {
                return Ok(Some(user));
            }
        }

        Ok(None)
    }

    pub async fn store_refresh_token(
        &self,
        user_id: &str,
        token: &str,
        expires_at: i64,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .bind(current_timestamp_seconds())
        .execute(&self.db.pool)
        .await?;

        Ok(())
    }

    pub async fn find_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn delete_refresh_token(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_refresh_tokens_for_user(&self, user_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_expired_tokens(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(current_timestamp_seconds())
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::utils::password::hash_password;

    async fn seed_user(db: &Database, email: &str) -> User {
        let hash = hash_password("Sup3rSecret").unwrap();
        UserService::new(db)
            .create_user(&uuid::Uuid::new_v4().to_string(), "Test User", email, &hash)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = test_database().await;
        let user = seed_user(&db, "auth@example.com").await;
        let service = AuthService::new(&db);

        let found = service
            .authenticate("auth@example.com", "Sup3rSecret")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, user.id);

        assert!(service
            .authenticate("auth@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(service
            .authenticate("nobody@example.com", "Sup3rSecret")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_refresh_token_lifecycle() {
        let db = test_database().await;
        let user = seed_user(&db, "tokens@example.com").await;
        let service = AuthService::new(&db);

        let future = current_timestamp_seconds() + 3600;
        service
            .store_refresh_token(&user.id, "tok-1", future)
            .await
            .unwrap();

        let stored = service.find_refresh_token("tok-1").await.unwrap().unwrap();
        assert_eq!(stored.user_id, user.id);
        assert!(!stored.is_expired(current_timestamp_seconds()));

        service.delete_refresh_tokens_for_user(&user.id).await.unwrap();
        assert!(service.find_refresh_token("tok-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_tokens() {
        let db = test_database().await;
        let user = seed_user(&db, "expired@example.com").await;
        let service = AuthService::new(&db);

        service
            .store_refresh_token(&user.id, "old", current_timestamp_seconds() - 10)
            .await
            .unwrap();
        service
            .store_refresh_token(&user.id, "fresh", current_timestamp_seconds() + 3600)
            .await
            .unwrap();

        service.delete_expired_tokens().await.unwrap();

        assert!(service.find_refresh_token("old").await.unwrap().is_none());
        assert!(service.find_refresh_token("fresh").await.unwrap().is_some());
    }
}
