use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::{AuthMiddleware, AuthUser};
use crate::models::{Mood, MoodForm, MoodQuery, MoodResponse, MoodUpdateForm};
use crate::services::{AnalyticsService, MoodService, TagService};
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .wrap(AuthMiddleware)
            .route(web::get().to(get_moods))
            .route(web::post().to(create_mood)),
    )
    .service(
        web::resource("/analytics")
            .wrap(AuthMiddleware)
            .route(web::get().to(get_analytics)),
    )
    .service(
        web::resource("/trends")
            .wrap(AuthMiddleware)
            .route(web::get().to(get_trends)),
    )
    .service(
        web::resource("/{id}")
            .wrap(AuthMiddleware)
            .route(web::get().to(get_mood))
            .route(web::put().to(update_mood))
            .route(web::delete().to(delete_mood)),
    );
}

async fn to_response(state: &AppState, mood: Mood) -> AppResult<MoodResponse> {
    let tags = TagService::new(&state.db).get_tags_for_mood(&mood.id).await?;
    Ok(MoodResponse::from_mood_and_tags(
        mood,
        tags.into_iter().map(Into::into).collect(),
    ))
}

/// Fetch an entry and enforce that it belongs to the caller.
async fn fetch_owned_mood(state: &AppState, auth_user: &AuthUser, id: &str) -> AppResult<Mood> {
    let mood = MoodService::new(&state.db)
        .get_mood_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Mood entry not found".to_string()))?;

    if mood.user_id != auth_user.user.id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(mood)
}

/// GET / - List the caller's entries, newest first.
async fn get_moods(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    query: web::Query<MoodQuery>,
) -> AppResult<HttpResponse> {
    let moods = MoodService::new(&state.db)
        .find_by_user(&auth_user.user.id, &query)
        .await?;

    let mut responses = Vec::with_capacity(moods.len());
    for mood in moods {
        responses.push(to_response(&state, mood).await?);
    }

    Ok(HttpResponse::Ok().json(responses))
}

/// POST / - Create an entry for the caller; 409 when one already exists
/// for the date.
async fn create_mood(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    form: web::Json<MoodForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let mood = MoodService::new(&state.db)
        .create_mood(&auth_user.user.id, &form)
        .await?;

    Ok(HttpResponse::Created().json(to_response(&state, mood).await?))
}

/// GET /{id}
async fn get_mood(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mood = fetch_owned_mood(&state, &auth_user, &path).await?;

    Ok(HttpResponse::Ok().json(to_response(&state, mood).await?))
}

/// PUT /{id}
async fn update_mood(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    path: web::Path<String>,
    form: web::Json<MoodUpdateForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let mood = fetch_owned_mood(&state, &auth_user, &path).await?;
    let updated = MoodService::new(&state.db).update_mood(&mood.id, &form).await?;

    Ok(HttpResponse::Ok().json(to_response(&state, updated).await?))
}

/// DELETE /{id}
async fn delete_mood(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mood = fetch_owned_mood(&state, &auth_user, &path).await?;
    MoodService::new(&state.db).delete_mood(&mood.id).await?;

    Ok(HttpResponse::Ok().json(json!({ "status": true })))
}

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    range: Option<String>,
}

/// GET /analytics?range=30d
async fn get_analytics(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    query: web::Query<AnalyticsQuery>,
) -> AppResult<HttpResponse> {
    let range = query.range.as_deref().unwrap_or("30d");

    let summary = AnalyticsService::new(&state.db)
        .get_analytics(&auth_user.user.id, range, state.config.top_tags_limit)
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}

#[derive(Debug, Deserialize)]
struct TrendsQuery {
    period: Option<String>,
}

/// GET /trends?period=week|month|year
async fn get_trends(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    query: web::Query<TrendsQuery>,
) -> AppResult<HttpResponse> {
    let period = query.period.as_deref().unwrap_or("week");

    let trends = AnalyticsService::new(&state.db)
        .get_trends(&auth_user.user.id, period)
        .await?;

    Ok(HttpResponse::Ok().json(trends))
}
