use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row in the `users` table. The email is the primary identifier.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    pub hashed_password: String,
    pub points: i64,
    pub last_redeemed: Option<DateTime<Utc>>,
}

/// Public projection of a user, returned by every profile-shaped endpoint.
/// Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
    pub points: i64,
    pub interests: Vec<String>,
}
