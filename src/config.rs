use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// S3/MinIO bucket holding profile photos.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Lifetime of pre-signed upload and download URLs.
    pub url_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub s3: S3Config,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "greenish".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "greenish-users".into()),
        };
        let s3 = S3Config {
            endpoint: std::env::var("S3_ENDPOINT").context("S3_ENDPOINT")?,
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "greenish-photos".into()),
            access_key: std::env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY")?,
            secret_key: std::env::var("S3_SECRET_KEY").context("S3_SECRET_KEY")?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            url_ttl_secs: std::env::var("PHOTO_URL_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30 * 60),
        };
        Ok(Self {
            database_url,
            jwt,
            s3,
        })
    }
}
