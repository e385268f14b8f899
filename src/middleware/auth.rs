use crate::error::AppError;
use crate::models::User;
use crate::services::UserService;
use crate::utils::auth::verify_jwt;
use crate::AppState;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::Error as ActixError,
    http::header,
    web, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

/// Authenticated caller, injected into request extensions by
/// [`AuthMiddleware`].
#[derive(Clone)]
pub struct AuthUser {
    pub user: User,
}

impl std::ops::Deref for AuthUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl actix_web::FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()));

        ready(result)
    }
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::InternalServerError("App state not found".to_string()))?;

            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer ").map(|s| s.to_string()))
                .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;

            let claims = verify_jwt(&token, &state.config.jwt_secret).map_err(|e| {
                tracing::debug!("JWT verification failed: {:?}", e);
                AppError::Unauthorized("Invalid or expired token".to_string())
            })?;

            if let Some(exp) = claims.exp {
                let now = chrono::Utc::now().timestamp();
                if now > exp {
                    tracing::debug!("Token expired at {}, current time {}", exp, now);
                    return Err(AppError::Unauthorized("Token expired".to_string()).into());
                }
            }

            let user = UserService::new(&state.db)
                .get_user_by_id(&claims.sub)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

            req.extensions_mut().insert(AuthUser { user });

            let res = service.call(req).await?;
            Ok(res)
        })
    }
}
