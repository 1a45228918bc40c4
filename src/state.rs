use std::sync::Arc;

use crate::{
    auth::{jwt::JwtKeys, password::Argon2Hasher},
    config::AppConfig,
    db::PgStore,
    photos::services::PhotoService,
    storage::{Storage, StorageClient},
    users::services::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
}

impl AppState {
    pub async fn init(config: &AppConfig, store: PgStore) -> anyhow::Result<Self> {
        // Real S3/MinIO
        let storage = Arc::new(Storage::new(&config.s3).await?) as Arc<dyn StorageClient>;

        let users = UserService::new(
            Arc::new(store),
            PhotoService::new(storage, config.s3.url_ttl_secs),
            Arc::new(JwtKeys::from_config(&config.jwt)),
            Arc::new(Argon2Hasher::default()),
        );
        Ok(Self::from_parts(users))
    }

    pub fn from_parts(users: UserService) -> Self {
        Self { users }
    }
}
