use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::{AuthMiddleware, AuthUser};
use crate::models::{
    LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest, TokenResponse,
    UpdateProfileRequest, UserResponse,
};
use crate::services::{AuthService, UserService};
use crate::utils::auth::{create_jwt, parse_duration, verify_jwt};
use crate::utils::password::{hash_password, is_strong_password};
use crate::utils::time::current_timestamp_seconds;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/refresh", web::post().to(refresh))
        .route("/logout", web::post().to(logout))
        .service(
            web::resource("/profile")
                .wrap(AuthMiddleware)
                .route(web::get().to(get_profile))
                .route(web::put().to(update_profile))
                .route(web::delete().to(delete_account)),
        );
}

/// Issue an access/refresh token pair and persist the refresh token.
async fn issue_tokens(state: &AppState, user_id: &str) -> AppResult<TokenResponse> {
    let config = &state.config;

    let token = create_jwt(user_id, &config.jwt_secret, &config.jwt_expires_in)?;
    let expires_at = chrono::Utc::now()
        .checked_add_signed(parse_duration(&config.jwt_expires_in)?)
        .map(|dt| dt.timestamp());

    let refresh_token = create_jwt(
        user_id,
        &config.jwt_refresh_secret,
        &config.jwt_refresh_expires_in,
    )?;
    let refresh_expires_at = chrono::Utc::now()
        .checked_add_signed(parse_duration(&config.jwt_refresh_expires_in)?)
        .ok_or_else(|| AppError::InternalServerError("Invalid expiration time".to_string()))?
        .timestamp();

    AuthService::new(&state.db)
        .store_refresh_token(user_id, &refresh_token, refresh_expires_at)
        .await?;

    Ok(TokenResponse {
        token,
        refresh_token: Some(refresh_token),
        token_type: "Bearer".to_string(),
        expires_at,
    })
}

/// POST /register - Create an account and sign in.
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    req.validate()?;

    if !is_strong_password(&req.password) {
        return Err(AppError::BadRequest(
            "Password must contain at least one uppercase letter, one lowercase letter and one digit"
                .to_string(),
        ));
    }

    let user_service = UserService::new(&state.db);
    let email = req.email.to_lowercase();

    if user_service.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = user_service
        .create_user(&Uuid::new_v4().to_string(), &req.name, &email, &password_hash)
        .await?;

    let tokens = issue_tokens(&state, &user.id).await?;

    Ok(HttpResponse::Created().json(tokens))
}

/// POST /login - Verify credentials and rotate the refresh token.
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    req.validate()?;

    let auth_service = AuthService::new(&state.db);
    let user = auth_service
        .authenticate(&req.email.to_lowercase(), &req.password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Rotation: drop this user's previous refresh tokens, plus any expired
    // leftovers from other sessions.
    auth_service.delete_refresh_tokens_for_user(&user.id).await?;
    auth_service.delete_expired_tokens().await?;

    let tokens = issue_tokens(&state, &user.id).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /refresh - Exchange a stored refresh token for a new access token.
async fn refresh(
    state: web::Data<AppState>,
    req: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let config = &state.config;

    let claims = verify_jwt(&req.refresh_token, &config.jwt_refresh_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

    let stored = AuthService::new(&state.db)
        .find_refresh_token(&req.refresh_token)
        .await?
        .filter(|t| !t.is_expired(current_timestamp_seconds()))
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

    if stored.user_id != claims.sub {
        return Err(AppError::Unauthorized(
            "Invalid or expired refresh token".to_string(),
        ));
    }

    let token = create_jwt(&claims.sub, &config.jwt_secret, &config.jwt_expires_in)?;
    let expires_at = chrono::Utc::now()
        .checked_add_signed(parse_duration(&config.jwt_expires_in)?)
        .map(|dt| dt.timestamp());

    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        refresh_token: None,
        token_type: "Bearer".to_string(),
        expires_at,
    }))
}

/// POST /logout - Invalidate the presented refresh token.
async fn logout(
    state: web::Data<AppState>,
    req: web::Json<LogoutRequest>,
) -> AppResult<HttpResponse> {
    if let Some(refresh_token) = &req.refresh_token {
        AuthService::new(&state.db)
            .delete_refresh_token(refresh_token)
            .await?;
    }

    Ok(HttpResponse::Ok().json(json!({ "status": true })))
}

/// GET /profile
async fn get_profile(auth_user: AuthUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse::from(auth_user.user)))
}

/// PUT /profile - Update name and/or email.
async fn update_profile(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    req: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    req.validate()?;

    let email = req.email.as_ref().map(|e| e.to_lowercase());
    let user = UserService::new(&state.db)
        .update_profile(&auth_user.user.id, req.name.as_deref(), email.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /profile - Delete the account; the schema cascades to entries
/// and refresh tokens.
async fn delete_account(
    state: web::Data<AppState>,
    auth_user: AuthUser,
) -> AppResult<HttpResponse> {
    UserService::new(&state.db).delete_user(&auth_user.user.id).await?;

    Ok(HttpResponse::Ok().json(json!({ "status": true })))
}
