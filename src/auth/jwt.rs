use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::JwtConfig;

/// Resolves the email identity carried by a bearer token.
pub trait TokenDecoder: Send + Sync {
    /// `raw` is the token itself, already stripped of the scheme prefix.
    fn extract_email(&self, raw: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user email
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(email = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl TokenDecoder for JwtKeys {
    fn extract_email(&self, raw: &str) -> anyhow::Result<String> {
        Ok(self.verify(raw)?.sub)
    }
}

#[cfg(test)]
pub(crate) fn test_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
    JwtKeys::from_config(&JwtConfig {
        secret: secret.into(),
        issuer: issuer.into(),
        audience: audience.into(),
    })
}

/// Issues a five-minute HS256 token for `email`; tokens come from an external
/// identity provider in production.
#[cfg(test)]
pub(crate) fn sign_test_token(secret: &str, issuer: &str, audience: &str, email: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: email.to_string(),
        iat: now.unix_timestamp() as usize,
        exp: (now + Duration::minutes(5)).unix_timestamp() as usize,
        iss: issuer.to_string(),
        aud: audience.to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign test token")
}
