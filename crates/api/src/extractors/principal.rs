//! Authenticated principal extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use domain::models::Role;
use shared::jwt::JwtConfig;

use crate::app::AppState;
use crate::error::ApiError;

/// The caller behind a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    /// `ADM###` or `PTR###`
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl Principal {
    /// Validates `token` and resolves the principal from its claims.
    pub fn from_token(jwt: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt.validate_token(token)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| ApiError::InvalidCredential("Unknown role in token".into()))?;

        Ok(Self {
            id: claims.sub,
            username: claims.username,
            role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin role required".into()))
        }
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let token = bearer_token(&parts.headers)?;
        Principal::from_token(&state.jwt, token)
    }
}
