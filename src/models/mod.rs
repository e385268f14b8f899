pub mod analytics;
pub mod auth;
pub mod mood;
pub mod tag;
pub mod user;

pub use analytics::{AnalyticsSummary, Granularity, MoodPoint, TrendBucket};
pub use auth::{
    Claims, LoginRequest, LogoutRequest, RefreshRequest, RefreshToken, RegisterRequest,
    TokenResponse,
};
pub use mood::{Mood, MoodForm, MoodQuery, MoodResponse, MoodUpdateForm};
pub use tag::{GroupWithTags, Tag, TagGroup, TagResponse, TagUsage};
pub use user::{UpdateProfileRequest, User, UserResponse};
