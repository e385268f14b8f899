use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::middleware::AuthMiddleware;
use crate::services::TagService;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .wrap(AuthMiddleware)
            .route(web::get().to(get_groups_with_tags)),
    );
}

/// GET / - The tag taxonomy: groups with their nested tags.
async fn get_groups_with_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let groups = TagService::new(&state.db).get_groups_with_tags().await?;

    Ok(HttpResponse::Ok().json(groups))
}
