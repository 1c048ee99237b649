use std::env;

/// Process configuration, loaded once at startup and injected into
/// handlers via `web::Data`. No ambient globals.
#[derive(Debug, Clone)]
pub struct Settings {
    pub secret_key: String,
    pub host: String,
    pub port: u16,
    pub app_origin: String,
    pub database_url: String,
}

impl Settings {
    pub fn from_env() -> Self {
        let secret_key = env::var("SECRET_KEY").expect("SECRET_KEY must be set");
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3002".to_string())
            .parse()
            .expect("PORT must be a valid port number");
        let app_origin =
            env::var("APP_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://db.sqlite".to_string());

        Self {
            secret_key,
            host,
            port,
            app_origin,
            database_url,
        }
    }
}
