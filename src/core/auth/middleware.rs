//! Session gateway middleware
//!
//! Resolves the caller's bearer access token to a user identity before any
//! protected handler runs, and attaches it to the request as a
//! [`CurrentUser`] extension. Access tokens travel only in the
//! `Authorization` header; the refresh cookie is read solely by the refresh
//! endpoint, keeping the two credential channels disjoint.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::core::auth::service::{AuthError, AuthService};
use crate::core::db::models::UserResponse;

/// The identity resolved by the session gateway, attached to the request
/// extensions. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserResponse);

#[derive(Debug, Serialize)]
struct GatewayError {
    message: String,
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(GatewayError {
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Middleware that requires a valid access token.
///
/// Use with `axum::middleware::from_fn_with_state` on every protected
/// route. On success the request gains a [`CurrentUser`] extension; on any
/// failure the response is a uniform 401 that does not reveal whether the
/// token was missing a signature, expired or of the wrong kind.
pub async fn require_auth(
    State(auth_service): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(request.headers()) {
        Some(t) => t,
        None => return unauthorized("Not authenticated"),
    };

    let user = match auth_service.resolve_access_token(&token).await {
        Ok(user) => user,
        Err(AuthError::UserNotFound) => return unauthorized("User not found"),
        Err(AuthError::Internal(detail)) => {
            tracing::error!("session gateway failure: {}", detail);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GatewayError {
                    message: "Server error".to_string(),
                }),
            )
                .into_response();
        }
        Err(_) => return unauthorized("Token invalid"),
    };

    request.extensions_mut().insert(CurrentUser(user));

    next.run(request).await
}

/// Extract a Bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}
