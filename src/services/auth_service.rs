use crate::{
    config::Settings,
    database::Database,
    services::user_service,
    utils::error::AppError,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed bearer-token lifetime.
pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user email
    pub iat: usize,  // issued at
    pub exp: usize,  // expiration
    pub jti: String, // JWT ID
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

pub fn generate_token(email: &str, secret: &str) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::minutes(ACCESS_TOKEN_EXPIRE_MINUTES)).timestamp() as usize;

    let claims = Claims {
        sub: email.to_string(),
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies signature and expiry. Tampered or expired tokens map to 401.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {}", e)))
}

pub async fn login(
    db: &Database,
    settings: &Settings,
    request: &LoginRequest,
) -> Result<TokenResponse, AppError> {
    let user = user_service::find_user(db, &request.email)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Incorrect email or password".into()))?;

    if !verify_password(&request.password, &user.hashed_password)? {
        return Err(AppError::Unauthenticated("Incorrect email or password".into()));
    }

    let access_token = generate_token(&user.email, &settings.secret_key)?;

    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
}
