use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_allow_origin: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in: String,
    pub jwt_refresh_secret: String,
    pub jwt_refresh_expires_in: String,
    pub top_tags_limit: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let cors_allow_origin =
            std::env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://mood_tracker.db".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let jwt_expires_in =
            std::env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| "1h".to_string());

        let jwt_refresh_secret =
            std::env::var("JWT_REFRESH_SECRET").context("JWT_REFRESH_SECRET must be set")?;
        let jwt_refresh_expires_in =
            std::env::var("JWT_REFRESH_EXPIRES_IN").unwrap_or_else(|_| "7d".to_string());

        let top_tags_limit = std::env::var("TOP_TAGS_LIMIT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("TOP_TAGS_LIMIT must be an integer")?;

        Ok(Config {
            host,
            port,
            cors_allow_origin,
            database_url,
            jwt_secret,
            jwt_expires_in,
            jwt_refresh_secret,
            jwt_refresh_expires_in,
            top_tags_limit,
        })
    }
}
