mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Logger, NormalizePath},
    web, App, HttpResponse, HttpServer,
};
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::db::Database;
use crate::routes::create_routes;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Mood Tracker API");

    let config = Config::from_env()?;
    info!("Configuration loaded from environment");

    let db = Database::new(&config.database_url).await?;
    info!("Database connected");

    db.run_migrations().await?;
    db.seed_taxonomy().await?;

    let state = web::Data::new(AppState {
        db: db.clone(),
        config: config.clone(),
    });

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let cors_allow_origin = config.cors_allow_origin.clone();

    info!("Server running at http://{}", addr);

    HttpServer::new(move || {
        let cors = if cors_allow_origin == "*" {
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600)
        } else {
            let origins: Vec<&str> = cors_allow_origin.split(',').map(|s| s.trim()).collect();
            let mut cors = Cors::default();
            for origin in origins {
                cors = cors.allowed_origin(origin);
            }
            cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                ])
                .supports_credentials()
                .max_age(3600)
        };

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .route("/health", web::get().to(health_check))
            .route("/health/db", web::get().to(health_check_db))
            .service(web::scope("/api").configure(create_routes))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": true }))
}

async fn health_check_db(
    state: web::Data<AppState>,
) -> Result<HttpResponse, crate::error::AppError> {
    sqlx::query("SELECT 1").execute(state.db.pool()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": true })))
}
