use crate::{
    database::Database,
    models::UserProfile,
    services::user_service,
    utils::error::AppError,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const REDEEM_INTERVAL_DAYS: i64 = 7;
pub const MEETING_WINDOW_DAYS: i64 = 31;
pub const PIZZA_COST: i64 = 10;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RewardReceipt {
    pub message: String,
    pub points: i64,
}

/// Redemption opens once per week.
pub fn redeem_eligible(last_redeemed: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_redeemed {
        Some(last) => last + Duration::days(REDEEM_INTERVAL_DAYS) <= now,
        None => true,
    }
}

/// Credits one point per distinct person met in meetings that started
/// within the last 31 days. Calling again inside the weekly interval is
/// a no-op returning the unchanged profile, not an error.
pub async fn redeem_points(
    db: &Database,
    email: &str,
    now: DateTime<Utc>,
) -> Result<UserProfile, AppError> {
    let user = user_service::get_user(db, email).await?;

    if !redeem_eligible(user.last_redeemed, now) {
        return user_service::profile_of(db, &user).await;
    }

    let window_start = now - Duration::days(MEETING_WINDOW_DAYS);
    let people_met: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT others.user_id)
         FROM participants mine
         JOIN participants others
           ON others.meeting_id = mine.meeting_id AND others.user_id <> mine.user_id
         JOIN meetings m ON m.id = mine.meeting_id
         WHERE mine.user_id = ? AND m.start_time >= ?",
    )
    .bind(&user.email)
    .bind(window_start)
    .fetch_one(db.pool())
    .await?;

    // Conditional update so two concurrent redeems cannot both credit
    // the same week.
    let eligible_before = now - Duration::days(REDEEM_INTERVAL_DAYS);
    let updated = sqlx::query(
        "UPDATE users SET points = points + ?, last_redeemed = ?
         WHERE email = ? AND (last_redeemed IS NULL OR last_redeemed <= ?)",
    )
    .bind(people_met)
    .bind(now)
    .bind(&user.email)
    .bind(eligible_before)
    .execute(db.pool())
    .await?;

    if updated.rows_affected() == 1 {
        log::info!("✅ {} redeemed {} points", user.email, people_met);
    }

    user_service::get_profile(db, &user.email).await
}

pub async fn buy_pizza(db: &Database, email: &str) -> Result<RewardReceipt, AppError> {
    let user = user_service::get_user(db, email).await?;

    let updated = sqlx::query("UPDATE users SET points = points - ? WHERE email = ? AND points >= ?")
        .bind(PIZZA_COST)
        .bind(&user.email)
        .bind(PIZZA_COST)
        .execute(db.pool())
        .await?;

    if updated.rows_affected() == 0 {
        // Re-read after the failed update; the balance fetched above may
        // already be stale under a concurrent spend.
        let current = user_service::get_profile(db, &user.email).await?;
        return Err(AppError::PaymentRequired(format!(
            "not enough points: {} of {} required",
            current.points, PIZZA_COST
        )));
    }

    let profile = user_service::get_profile(db, &user.email).await?;
    log::info!("🍕 {} bought a pizza, {} points left", user.email, profile.points);

    Ok(RewardReceipt {
        message: format!(
            "Enjoy your pizza, {}!",
            user.name.as_deref().unwrap_or(&user.email)
        ),
        points: profile.points,
    })
}
