use crate::{
    database::Database,
    models::{User, UserProfile},
    services::auth_service,
    utils::error::{is_unique_violation, AppError},
};
use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InterestsRequest {
    pub interests: Vec<String>,
}

pub async fn find_user(db: &Database, email: &str) -> Result<Option<User>, AppError> {
    Ok(
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db.pool())
            .await?,
    )
}

/// Loads the caller behind a verified token. The row can only be missing
/// if the token outlived the store, so that maps to 401.
pub async fn get_user(db: &Database, email: &str) -> Result<User, AppError> {
    find_user(db, email)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Unknown user".into()))
}

async fn interests_of(db: &Database, email: &str) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar::<_, String>(
        "SELECT subject FROM interests WHERE user_id = ? ORDER BY subject",
    )
    .bind(email)
    .fetch_all(db.pool())
    .await?)
}

pub async fn profile_of(db: &Database, user: &User) -> Result<UserProfile, AppError> {
    let interests = interests_of(db, &user.email).await?;

    Ok(UserProfile {
        email: user.email.clone(),
        name: user.name.clone(),
        points: user.points,
        interests,
    })
}

pub async fn get_profile(db: &Database, email: &str) -> Result<UserProfile, AppError> {
    let user = get_user(db, email).await?;
    profile_of(db, &user).await
}

pub async fn register(db: &Database, request: &RegisterRequest) -> Result<UserProfile, AppError> {
    if !request.email.contains('@') {
        return Err(AppError::InvalidRequest("a valid email is required".into()));
    }
    if request.password.is_empty() {
        return Err(AppError::InvalidRequest("password is required".into()));
    }

    let hashed = auth_service::hash_password(&request.password)?;

    let result = sqlx::query("INSERT INTO users (email, name, hashed_password) VALUES (?, ?, ?)")
        .bind(&request.email)
        .bind(&request.name)
        .bind(&hashed)
        .execute(db.pool())
        .await;

    match result {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict(format!(
                "{} is already registered",
                request.email
            )));
        }
        Err(e) => return Err(e.into()),
    }

    log::info!("✅ User registered: {}", request.email);

    get_profile(db, &request.email).await
}

/// Adds each subject the caller does not already have. Duplicates are
/// skipped silently, both within the request and against stored rows.
/// The batch commits as a whole or not at all.
pub async fn add_interests(
    db: &Database,
    email: &str,
    request: &InterestsRequest,
) -> Result<UserProfile, AppError> {
    let user = get_user(db, email).await?;

    let mut tx = db.pool().begin().await?;
    for subject in &request.interests {
        let subject = subject.trim();
        if subject.is_empty() {
            continue;
        }

        sqlx::query("INSERT OR IGNORE INTO interests (user_id, subject) VALUES (?, ?)")
            .bind(&user.email)
            .bind(subject)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    profile_of(db, &user).await
}
