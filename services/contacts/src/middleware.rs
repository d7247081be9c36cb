//! Authentication middleware for JWT token validation
//!
//! Tokens are issued elsewhere; this service only verifies them. The `sub`
//! claim becomes the owner identifier for every contact operation.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Fallback header carrying a bare token
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no access token provided")]
    MissingToken,

    #[error("invalid access token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Verifies HS256 access tokens against the configured secret
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return the user it names
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let token_data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        Ok(AuthUser {
            id: token_data.claims.sub,
        })
    }
}

/// Pull the token from `Authorization: Bearer` or the fallback header
fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
    {
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken);
    }

    headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = extract_token(req.headers())
        .and_then(|token| state.verifier.authenticate(token))
        .map_err(|e| {
            warn!("Rejected request to {}: {}", req.uri().path(), e);
            ApiError::Unauthorized
        })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
