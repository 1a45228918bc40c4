use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Photo record; `s3_key` points at the object in the photo bucket.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub s3_key: String,
    pub created_at: OffsetDateTime,
}
