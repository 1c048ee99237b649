use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::HeaderMap,
    web, Error, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::{
    config::Settings,
    services::auth_service::{self, Claims},
    utils::error::AppError,
};

/// Caller identity extracted from a verified bearer token, stored in the
/// request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

/// Pulls and verifies the bearer token on a request. Shared by the
/// middleware and handlers that authenticate on their own.
pub fn bearer_claims(headers: &HeaderMap, settings: &Settings) -> Result<Claims, AppError> {
    let header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization token".into()))?;
    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid token format".into()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Invalid token format".into()))?;

    auth_service::verify_token(token, &settings.secret_key)
}

/// Caller email for a request that went through `AuthMiddleware`.
pub fn authed_email(req: &HttpRequest) -> Result<String, AppError> {
    req.extensions()
        .get::<AuthedUser>()
        .map(|user| user.0.clone())
        .ok_or_else(|| AppError::Unauthenticated("Missing authentication context".into()))
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let settings = req.app_data::<web::Data<Settings>>().cloned();

        let verified = match settings {
            Some(settings) => bearer_claims(req.headers(), &settings),
            None => Err(AppError::Internal("settings not configured".into())),
        };

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(AuthedUser(claims.sub));
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => Box::pin(async move { Err(e.into()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::generate_token;
    use crate::services::test_support::test_settings;
    use actix_web::http::header::{HeaderValue, AUTHORIZATION};

    fn headers_with(value: HeaderValue) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        headers
    }

    #[test]
    fn missing_authorization_header_is_rejected() {
        let result = bearer_claims(&HeaderMap::new(), &test_settings());

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let headers = headers_with(HeaderValue::from_static("Basic dXNlcjpwYXNz"));

        let result = bearer_claims(&headers, &test_settings());

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[test]
    fn non_utf8_header_value_is_rejected() {
        let value = HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap();
        let headers = headers_with(value);

        let result = bearer_claims(&headers, &test_settings());

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[test]
    fn well_formed_bearer_token_resolves_to_its_claims() {
        let settings = test_settings();
        let token = generate_token("a@mail.com", &settings.secret_key).unwrap();
        let headers = headers_with(
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let claims = bearer_claims(&headers, &settings).unwrap();

        assert_eq!(claims.sub, "a@mail.com");
    }
}
