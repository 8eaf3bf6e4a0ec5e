//! Raw authentication token extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::AppError;

/// Token carried by the `Authorization` header, raw or `Bearer`-prefixed.
///
/// Nothing is verified here; the services decide whether the token is valid.
/// A missing or non-UTF-8 header yields an empty token, which no token
/// manager accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_header(value: &str) -> Self {
        let value = value.trim();
        let token = value.strip_prefix(BEARER_TOKEN_PREFIX).unwrap_or(value);
        AuthToken(token.trim().to_string())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(AuthToken::from_header)
            .unwrap_or_default())
    }
}
