use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    config::Settings,
    database::Database,
    middleware::auth::{authed_email, bearer_claims},
    models::UserProfile,
    services::user_service::{self, InterestsRequest, RegisterRequest},
    utils::error::AppError,
};

#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserProfile),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    db: web::Data<Database>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /user - email: {}", request.email);

    let profile = user_service::register(&db, &request).await?;

    Ok(HttpResponse::Created().json(profile))
}

// GET /user shares its path with the unauthenticated registration
// resource, so it verifies the bearer token itself instead of sitting
// behind the middleware.
#[utoipa::path(
    get,
    path = "/user",
    tag = "Users",
    responses(
        (status = 200, description = "Caller profile", body = UserProfile),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    db: web::Data<Database>,
    settings: web::Data<Settings>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    log::info!("👤 GET /user");

    let claims = bearer_claims(req.headers(), &settings)?;
    let profile = user_service::get_profile(&db, &claims.sub).await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    post,
    path = "/user/interests",
    tag = "Users",
    request_body = InterestsRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_interests(
    db: web::Data<Database>,
    request: web::Json<InterestsRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let email = authed_email(&req)?;
    log::info!("🏷️ POST /user/interests - email: {}", email);

    let profile = user_service::add_interests(&db, &email, &request).await?;

    Ok(HttpResponse::Ok().json(profile))
}
