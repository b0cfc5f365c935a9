use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::JwtConfig;
use crate::error::AppError;

/// Identity of the caller, passed explicitly into every controller action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub user_id: String,
}

impl CurrentUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token lifetime of {0} hours is out of range")]
    Lifetime(i64),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Signs an HS256 token whose subject is `user_id`.
pub fn issue_token(user_id: &str, jwt: &JwtConfig) -> Result<String, TokenError> {
    let hours = jwt.expires_in_hours;
    let exp = Duration::try_hours(hours)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .and_then(|exp| usize::try_from(exp.timestamp()).ok())
        .ok_or(TokenError::Lifetime(hours))?;

    let claims = Claims { sub: user_id.to_string(), exp };
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt.secret.as_bytes()))?)
}

pub fn verify_token(token: &str, jwt: &JwtConfig) -> Result<CurrentUser, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))?;

    if data.claims.sub.trim().is_empty() {
        return Err(AppError::Unauthorized("token has no subject".to_string()));
    }
    Ok(CurrentUser { user_id: data.claims.sub })
}

// Bearer JWT extractor
impl FromRequestParts<Arc<crate::AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected a Bearer token".to_string()))?;

        verify_token(token.trim(), &state.config.jwt)
    }
}
