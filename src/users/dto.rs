use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_NICKNAME_LEN: usize = 20;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
    /// Name of the profile photo the client is about to upload.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl SignUpRequest {
    /// Normalizes the fields and rejects malformed input.
    pub fn validate(mut self) -> AppResult<Self> {
        self.email = normalize_email(&self.email);
        self.nickname = self.nickname.trim().to_string();

        if !is_valid_email(&self.email) {
            return Err(AppError::Validation("invalid email".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation("password too short".into()));
        }
        if self.nickname.is_empty() {
            return Err(AppError::Validation("nickname is required".into()));
        }
        if self.nickname.chars().count() > MAX_NICKNAME_LEN {
            return Err(AppError::Validation("nickname too long".into()));
        }
        if let Some(name) = &self.file_name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("file_name must not be blank".into()));
            }
        }
        Ok(self)
    }
}

/// Returned after signup; `upload_url` is present when a photo was announced.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
}

/// Public profile projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub photo_path: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NicknameQuery {
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct DuplicateResponse {
    pub duplicate: bool,
}
