use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Default tag taxonomy inserted on first start. Groups own their tags;
/// deleting a group cascades to its tags and to mood associations.
const DEFAULT_TAXONOMY: &[(&str, &[&str])] = &[
    ("Activities", &["Work", "Study", "Exercise", "Leisure"]),
    ("Emotions", &["Happy", "Sad", "Anxious", "Calm"]),
    ("Social", &["Friends", "Family", "Alone", "Party"]),
    ("Weather", &["Sunny", "Rainy", "Cloudy"]),
    ("Health", &["Slept well", "Ate well", "Sick"]),
];

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_options)
            .await?;

        Ok(Database { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        let migrations = vec![include_str!("../migrations/sqlite/001_initial.sql")];

        for (idx, migration_sql) in migrations.iter().enumerate() {
            tracing::info!("Running migration {}", idx + 1);

            // Statements are separated by semicolons; comment lines are stripped
            // before splitting so a leading comment does not swallow a statement.
            let stripped: String = migration_sql
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n");

            for statement in stripped.split(';') {
                let trimmed = statement.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Err(e) = sqlx::query(trimmed).execute(&self.pool).await {
                    if e.to_string().contains("already exists") {
                        tracing::debug!("Skipping existing object in migration {}: {}", idx + 1, e);
                    } else {
                        return Err(e.into());
                    }
                }
            }
        }

        tracing::info!("All migrations completed");
        Ok(())
    }

    /// Seed the default tag taxonomy on an empty database.
    pub async fn seed_taxonomy(&self) -> anyhow::Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(id) FROM tag_groups")
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            tracing::debug!("Tag taxonomy already seeded, skipping");
            return Ok(());
        }

        tracing::info!("Seeding default tag taxonomy");

        for (group_name, tags) in DEFAULT_TAXONOMY {
            let group_id = Uuid::new_v4().to_string();

            sqlx::query("INSERT INTO tag_groups (id, name) VALUES ($1, $2)")
                .bind(&group_id)
                .bind(group_name)
                .execute(&self.pool)
                .await?;

            for tag_name in *tags {
                sqlx::query("INSERT INTO tags (id, name, group_id) VALUES ($1, $2, $3)")
                    .bind(Uuid::new_v4().to_string())
                    .bind(tag_name)
                    .bind(&group_id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub async fn test_database() -> Database {
    // In-memory SQLite lives per-connection, so the test pool is capped at one.
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .unwrap();

    let db = Database { pool };
    db.run_migrations().await.unwrap();
    db
}
