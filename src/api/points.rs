use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::{
    database::Database,
    middleware::auth::authed_email,
    models::UserProfile,
    services::points_service::{self, RewardReceipt},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/points/redeem",
    tag = "Points",
    responses(
        (status = 200, description = "Updated profile; a no-op inside the weekly interval", body = UserProfile),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn redeem_points(
    db: web::Data<Database>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let email = authed_email(&req)?;
    log::info!("💰 POST /points/redeem - email: {}", email);

    let profile = points_service::redeem_points(&db, &email, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    post,
    path = "/points/pizza",
    tag = "Points",
    responses(
        (status = 200, description = "Reward confirmation", body = RewardReceipt),
        (status = 401, description = "Unauthenticated"),
        (status = 402, description = "Insufficient points")
    ),
    security(("bearer_auth" = []))
)]
pub async fn buy_pizza(
    db: web::Data<Database>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let email = authed_email(&req)?;
    log::info!("🍕 POST /points/pizza - email: {}", email);

    let receipt = points_service::buy_pizza(&db, &email).await?;

    Ok(HttpResponse::Ok().json(receipt))
}
