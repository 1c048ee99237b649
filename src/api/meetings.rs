use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::{
    database::Database,
    middleware::auth::authed_email,
    models::{Meeting, UserProfile},
    services::meeting_service::{self, CreateMeetingRequest},
    utils::error::AppError,
};

#[utoipa::path(
    get,
    path = "/meetings",
    tag = "Meetings",
    responses(
        (status = 200, description = "Meetings that have not ended yet", body = [Meeting]),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_meetings(
    db: web::Data<Database>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    authed_email(&req)?;
    log::info!("📅 GET /meetings");

    let meetings = meeting_service::list_open(&db, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(meetings))
}

#[utoipa::path(
    post,
    path = "/meetings",
    tag = "Meetings",
    request_body = CreateMeetingRequest,
    responses(
        (status = 201, description = "Meeting created, creator enrolled", body = Meeting),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Join cooldown active")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_meeting(
    db: web::Data<Database>,
    request: web::Json<CreateMeetingRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let email = authed_email(&req)?;
    log::info!("📅 POST /meetings - creator: {}", email);

    let meeting = meeting_service::create_meeting(&db, &email, &request, Utc::now()).await?;

    Ok(HttpResponse::Created().json(meeting))
}

#[utoipa::path(
    post,
    path = "/meetings/{meeting_id}/join",
    tag = "Meetings",
    params(("meeting_id" = String, Path, description = "Meeting code")),
    responses(
        (status = 200, description = "Joined", body = Meeting),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Meeting full or join cooldown active"),
        (status = 404, description = "Unknown meeting"),
        (status = 409, description = "Already joined")
    ),
    security(("bearer_auth" = []))
)]
pub async fn join_meeting(
    db: web::Data<Database>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let email = authed_email(&req)?;
    let meeting_id = path.into_inner();
    log::info!("🤝 POST /meetings/{}/join - email: {}", meeting_id, email);

    let meeting = meeting_service::join_meeting(&db, &email, &meeting_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(meeting))
}

#[utoipa::path(
    get,
    path = "/meetings/{meeting_id}/participants",
    tag = "Meetings",
    params(("meeting_id" = String, Path, description = "Meeting code")),
    responses(
        (status = 200, description = "Participant profiles", body = [UserProfile]),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Unknown meeting")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_participants(
    db: web::Data<Database>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let email = authed_email(&req)?;
    let meeting_id = path.into_inner();
    log::info!("👥 GET /meetings/{}/participants", meeting_id);

    let profiles = meeting_service::participants(&db, &email, &meeting_id).await?;

    Ok(HttpResponse::Ok().json(profiles))
}
