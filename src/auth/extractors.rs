use axum::{extract::FromRequestParts, http::request::Parts};
use async_trait::async_trait;

use crate::error::AppError;

/// Raw `Authorization` header value, scheme included.
///
/// Verification is left to the user service, which owns the scheme split.
pub struct AuthHeader(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthHeader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;
        let value = header.to_str().map_err(|_| {
            AppError::Unauthorized("Authorization header is not valid ASCII".into())
        })?;
        Ok(AuthHeader(value.to_string()))
    }
}
