mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Configuration is read once here and injected everywhere else.
    let settings = config::Settings::from_env();

    log::info!("🚀 Starting Meetup Service...");
    log::info!("📊 Database: {}", settings.database_url);

    let db = database::Database::new(&settings.database_url)
        .await
        .expect("Failed to open database");

    log::info!("✅ Database connected successfully");

    let db_data = web::Data::new(db.clone());
    let settings_data = web::Data::new(settings.clone());

    let bind_addr = format!("{}:{}", settings.host, settings.port);
    log::info!("🌐 Server starting on {}", bind_addr);
    log::info!(
        "📚 Swagger UI available at: http://{}/swagger-ui/",
        bind_addr
    );

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&settings_data.app_origin)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(settings_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Token issuance (credentials in body)
            .route("/token", web::post().to(api::auth::login))
            // Registration is public; the profile read on the same path
            // verifies its own bearer token.
            .service(
                web::resource("/user")
                    .route(web::post().to(api::users::register))
                    .route(web::get().to(api::users::get_me)),
            )
            .service(
                web::scope("/user")
                    .wrap(middleware::AuthMiddleware)
                    .route("/interests", web::post().to(api::users::add_interests)),
            )
            // Meetings
            .service(
                web::scope("/meetings")
                    .wrap(middleware::AuthMiddleware)
                    .route("", web::get().to(api::meetings::list_meetings))
                    .route("", web::post().to(api::meetings::create_meeting))
                    .route(
                        "/{meeting_id}/join",
                        web::post().to(api::meetings::join_meeting),
                    )
                    .route(
                        "/{meeting_id}/participants",
                        web::get().to(api::meetings::list_participants),
                    ),
            )
            // Points & rewards
            .service(
                web::scope("/points")
                    .wrap(middleware::AuthMiddleware)
                    .route("/redeem", web::post().to(api::points::redeem_points))
                    .route("/pizza", web::post().to(api::points::buy_pizza)),
            )
            // Recommendations
            .service(
                web::scope("/recommendations")
                    .wrap(middleware::AuthMiddleware)
                    .route("", web::get().to(api::recommendations::get_recommendations)),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
