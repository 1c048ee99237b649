use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meetup Service API",
        version = "1.0.0",
        description = "Social-meetup backend: time-boxed meetings, points for distinct people met, pizza rewards and interest-based friend recommendations.\n\n**Authentication:** all endpoints except registration, token issuance and health require a JWT Bearer token."
    ),
    paths(
        // Auth
        crate::api::auth::login,

        // Users
        crate::api::users::register,
        crate::api::users::get_me,
        crate::api::users::add_interests,

        // Meetings
        crate::api::meetings::list_meetings,
        crate::api::meetings::create_meeting,
        crate::api::meetings::join_meeting,
        crate::api::meetings::list_participants,

        // Points
        crate::api::points::redeem_points,
        crate::api::points::buy_pizza,

        // Recommendations
        crate::api::recommendations::get_recommendations,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::TokenResponse,
            crate::services::user_service::RegisterRequest,
            crate::services::user_service::InterestsRequest,
            crate::services::meeting_service::CreateMeetingRequest,
            crate::services::points_service::RewardReceipt,
            crate::models::Meeting,
            crate::models::UserProfile,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Bearer-token issuance for registered users."),
        (name = "Users", description = "Registration, profiles and interest tags."),
        (name = "Meetings", description = "Create, list and join time-boxed meetings (max 6 participants, 1-hour join cooldown)."),
        (name = "Points", description = "Weekly point redemption and pizza rewards."),
        (name = "Recommendations", description = "Friend suggestions from shared interests, excluding people already met."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
