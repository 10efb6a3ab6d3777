//! Bearer token authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::extractors::principal::{bearer_token, Principal};

/// Middleware that requires a valid bearer token.
///
/// Missing tokens are rejected with `unauthorized`, bad or expired tokens
/// with `invalid_credential`. The resolved [`Principal`] is stored in the
/// request extensions for handlers and the rate limiter.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let principal = match bearer_token(req.headers())
        .and_then(|token| Principal::from_token(&state.jwt, token))
    {
        Ok(principal) => principal,
        Err(err) => {
            tracing::debug!(error = %err, "Bearer authentication failed");
            return err.into_response();
        }
    };

    req.extensions_mut().insert(principal);
    next.run(req).await
}
