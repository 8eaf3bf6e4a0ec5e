//! Signed identity tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::domain::{TokenPayload, UserRole};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token service: issues and validates tokens carrying a [`TokenPayload`].
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenManager: Send + Sync {
    /// Issue a signed token for `payload`
    fn create_token(&self, payload: &TokenPayload) -> AppResult<String>;

    /// Decode a token. Returns `None` when it is malformed, forged or expired.
    fn get_payload(&self, token: &str) -> Option<TokenPayload>;
}

/// HS256 JWT implementation of [`TokenManager`]
pub struct JwtTokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: i64,
}

impl JwtTokenManager {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret_bytes()),
            expiration_hours: config.jwt_expiration_hours,
        }
    }
}

impl TokenManager for JwtTokenManager {
    fn create_token(&self, payload: &TokenPayload) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiration_hours);

        let claims = Claims {
            id: payload.id.clone(),
            name: payload.name.clone(),
            role: payload.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    fn get_payload(&self, token: &str) -> Option<TokenPayload> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) => Some(TokenPayload {
                id: data.claims.id,
                name: data.claims.name,
                role: UserRole::from(data.claims.role.as_str()),
            }),
            Err(e) => {
                tracing::debug!("Rejected token: {}", e);
                None
            }
        }
    }
}
