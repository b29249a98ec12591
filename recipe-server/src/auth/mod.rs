//! JWT authentication module
//!
//! Provides the `AuthenticatedUser` extractor for Axum handlers. Tokens are
//! HS256-signed with the server's `JWT_SECRET`; the `sub` claim carries the
//! numeric owner id.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use recipe_core::OwnerId;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims accepted by the API
#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject (owner id, decimal)
    sub: String,
    /// Expiration time (validated by jsonwebtoken)
    #[allow(dead_code)]
    exp: u64,
}

/// Key material and validation rules for incoming bearer tokens
pub struct JwtKeys {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    /// Build HS256 keys from a shared secret
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// Validate a JWT token and extract its claims.
fn validate_jwt(token: &str, keys: &JwtKeys) -> Result<Claims, ApiError> {
    let token_data = decode::<Claims>(token, &keys.decoding_key, &keys.validation).map_err(
        |e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ApiError::auth_error("AUTH_TOKEN_EXPIRED", "JWT token has expired")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::auth_error("AUTH_INVALID_TOKEN", "Invalid JWT signature")
            }
            _ => ApiError::auth_error(
                "AUTH_INVALID_TOKEN",
                format!("JWT validation failed: {}", e),
            ),
        },
    )?;

    Ok(token_data.claims)
}

/// Resolve the owner a token speaks for
fn owner_from_claims(claims: &Claims) -> Result<OwnerId, ApiError> {
    claims.sub.parse::<i64>().map(OwnerId).map_err(|_| {
        ApiError::auth_error(
            "AUTH_INVALID_TOKEN",
            "JWT subject is not a valid user id",
        )
    })
}

/// Extract the Bearer token from the Authorization header
fn extract_bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::auth_error("AUTH_MISSING_TOKEN", "Missing Authorization header")
        })?;

    let auth_value = auth_header.to_str().map_err(|_| {
        ApiError::auth_error(
            "AUTH_INVALID_TOKEN",
            "Invalid Authorization header encoding",
        )
    })?;

    auth_value.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::auth_error(
            "AUTH_INVALID_TOKEN",
            "Authorization header must use Bearer scheme",
        )
    })
}

/// Authenticated caller of a recipe endpoint.
///
/// The extractor reads `Authorization: Bearer <token>`, validates the token
/// and parses its subject into an [`OwnerId`]. Every failure is a 401 with
/// a structured error code.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub owner: OwnerId,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let claims = validate_jwt(token, &state.jwt_keys)?;
        let owner = owner_from_claims(&claims)?;

        tracing::debug!(owner = %owner, "Authenticated request");
        Ok(AuthenticatedUser { owner })
    }
}
