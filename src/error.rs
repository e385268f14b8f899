use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

#[derive(Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    for (field, errs) in errors.field_errors() {
        for e in errs {
            out.push(FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            });
        }
    }
    out
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let mut errors = None;

        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Validation(ref e) => {
                errors = Some(field_errors(e));
                "Validation failed".to_string()
            }
            AppError::BadRequest(ref e) => e.clone(),
            AppError::InvalidArgument(ref e) => e.clone(),
            AppError::Unauthorized(ref e) => e.clone(),
            AppError::Forbidden(ref e) => e.clone(),
            AppError::NotFound(ref e) => e.clone(),
            AppError::Conflict(ref e) => e.clone(),
            AppError::Jwt(ref e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid token".to_string()
            }
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::InternalServerError(ref e) => {
                tracing::error!("Internal server error: {:?}", e);
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            message,
            errors,
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Unique-constraint losers surface as Conflict so a duplicate (user, date)
// entry or email races to a 409 instead of a 500.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Resource already exists".to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest("Referenced resource does not exist".to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
