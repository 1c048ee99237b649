use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    database::Database,
    middleware::auth::authed_email,
    models::UserProfile,
    services::recommendation_service,
    utils::error::AppError,
};

#[utoipa::path(
    get,
    path = "/recommendations",
    tag = "Recommendations",
    responses(
        (status = 200, description = "People sharing an interest, minus those already met", body = [UserProfile]),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_recommendations(
    db: web::Data<Database>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let email = authed_email(&req)?;
    log::info!("✨ GET /recommendations - email: {}", email);

    let profiles = recommendation_service::recommendations(&db, &email).await?;

    Ok(HttpResponse::Ok().json(profiles))
}
