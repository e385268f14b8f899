pub mod auth;
pub mod moods;
pub mod tags;

use actix_web::web;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").configure(auth::create_routes))
        .service(web::scope("/moods").configure(moods::create_routes))
        .service(web::scope("/tags").configure(tags::create_routes));
}
