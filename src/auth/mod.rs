pub mod extractors;
pub mod jwt;
pub mod password;

use crate::error::{AppError, AppResult};

/// Takes the credential out of `"<scheme> <token>"`.
pub fn bearer_credential(header: &str) -> AppResult<&str> {
    header
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("malformed Authorization header".into()))
}
