use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub email: String,              // unique
    pub nickname: String,           // unique
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub photo_id: Option<Uuid>,     // profile photo, if any
    pub created_at: OffsetDateTime, // creation timestamp
}

/// Row to insert on signup; the photo is attached afterwards.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub password_hash: String,
}
