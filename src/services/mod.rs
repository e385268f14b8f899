pub mod analytics;
pub mod auth;
pub mod mood;
pub mod tag;
pub mod user;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use mood::MoodService;
pub use tag::TagService;
pub use user::UserService;
