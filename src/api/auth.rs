use actix_web::{web, HttpResponse};

use crate::{
    config::Settings,
    database::Database,
    services::auth_service::{self, LoginRequest, TokenResponse},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/token",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    db: web::Data<Database>,
    settings: web::Data<Settings>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /token - email: {}", request.email);

    let response = auth_service::login(&db, &settings, &request).await?;

    log::info!("✅ Token issued: {}", request.email);
    Ok(HttpResponse::Ok().json(response))
}
