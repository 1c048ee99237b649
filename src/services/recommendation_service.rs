use crate::{
    database::Database,
    models::UserProfile,
    services::user_service,
    utils::error::AppError,
};
use std::collections::HashSet;

/// Everyone who has ever shared a meeting with the user, deduplicated,
/// self excluded.
pub async fn known_people(db: &Database, email: &str) -> Result<HashSet<String>, AppError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT others.user_id
         FROM participants mine
         JOIN participants others
           ON others.meeting_id = mine.meeting_id AND others.user_id <> mine.user_id
         WHERE mine.user_id = ?",
    )
    .bind(email)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.into_iter().collect())
}

/// Everyone sharing at least one exact interest subject with the user.
pub async fn similar_people(db: &Database, email: &str) -> Result<HashSet<String>, AppError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT others.user_id
         FROM interests mine
         JOIN interests others
           ON others.subject = mine.subject AND others.user_id <> mine.user_id
         WHERE mine.user_id = ?",
    )
    .bind(email)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.into_iter().collect())
}

/// Interest-based policy: people who share a subject with the caller,
/// minus the people the caller has already met.
pub async fn recommendations(db: &Database, email: &str) -> Result<Vec<UserProfile>, AppError> {
    let known = known_people(db, email).await?;
    let similar = similar_people(db, email).await?;

    let mut candidates: Vec<&String> = similar.difference(&known).collect();
    candidates.sort();

    let mut profiles = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(user) = user_service::find_user(db, candidate).await? {
            profiles.push(user_service::profile_of(db, &user).await?);
        }
    }

    Ok(profiles)
}
