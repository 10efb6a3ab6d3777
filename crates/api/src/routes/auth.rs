//! Signup and one-time code login handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::SignupRequest;
use domain::models::User;
use serde::Deserialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::{CodeIssued, IssuedToken};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email address
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    /// Username or email address
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 4, max = 10, message = "otp must be 4-10 digits"))]
    pub otp: String,
}

/// Register an admin or patrol.
///
/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.directory.signup(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Verify the password and mail a one-time code.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CodeIssued>, ApiError> {
    request.validate()?;
    let issued = state
        .auth
        .login(request.username.trim(), &request.password)
        .await?;
    Ok(Json(issued))
}

/// Exchange a one-time code for a bearer token.
///
/// POST /api/v1/auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    request.validate()?;
    let token = state
        .auth
        .verify_code(request.username.trim(), &request.otp)
        .await?;
    Ok(Json(token))
}
