//! Auth API endpoints
//!
//! Provides REST API endpoints for authentication:
//! - POST /api/auth/register - Register a new user (auto-authenticates)
//! - POST /api/auth/login - Login and get an access token + refresh cookie
//! - POST /api/auth/refresh - Exchange the refresh cookie for a new access token
//! - POST /api/auth/logout - Clear the refresh cookie
//! - GET /api/auth/me - Get current user info (behind the session gateway)

use axum::{
    Extension, Json, Router, middleware,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::auth::middleware::{CurrentUser, require_auth};
use crate::core::auth::service::{AuthError, AuthService, LoginRequest, RegisterRequest};
use crate::core::config::AppConfig;
use crate::core::db::models::UserResponse;

/// Path the refresh cookie is scoped to. Only the refresh endpoint ever
/// sees it.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth/refresh";

/// Auth API state containing the auth service and cookie settings
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
    pub cookie_options: RefreshCookieOptions,
}

/// Refresh cookie attributes, fixed at startup from the configuration
#[derive(Debug, Clone)]
pub struct RefreshCookieOptions {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age_days: i64,
}

impl RefreshCookieOptions {
    /// Derive the cookie contract from the application configuration:
    /// `Secure` and `SameSite=None` only in production, `Lax` otherwise.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.production,
            same_site: if config.production {
                SameSite::None
            } else {
                SameSite::Lax
            },
            max_age_days: config.refresh_token_ttl_days,
        }
    }

    /// Build the http-only refresh cookie carrying the given token
    pub fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token))
            .path(REFRESH_COOKIE_PATH)
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::days(self.max_age_days))
            .build()
    }

    /// Build the cleared cookie set by logout. Browsers only overwrite a
    /// cookie when the path and flags match the original exactly, so every
    /// attribute except the value and expiry is identical to [`issue`].
    ///
    /// [`issue`]: RefreshCookieOptions::issue
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), ""))
            .path(REFRESH_COOKIE_PATH)
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::ZERO)
            .build();
        cookie.set_expires(time::OffsetDateTime::UNIX_EPOCH);
        cookie
    }
}

/// Uniform API error body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Convert AuthError to an API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MissingFields | AuthError::EmailTaken => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::UserNotFound => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AuthError::Internal(detail) => {
                // Full detail stays server-side
                tracing::error!("auth internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(ApiError::new(message))).into_response()
    }
}

/// Refresh endpoint failures. All verification failures share one message
/// so the client cannot tell an expired token from a malformed one.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("No refresh token")]
    Missing,

    #[error("Invalid refresh token")]
    Invalid,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for RefreshError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RefreshError::Missing | RefreshError::Invalid => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            RefreshError::Internal(detail) => {
                tracing::error!("refresh internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(ApiError::new(message))).into_response()
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response for register/login: access token in the body, user public
/// fields, refresh token in the Set-Cookie header
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub access_token: String,
    pub user: UserResponse,
}

/// Response for token refresh
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Router
// ============================================================================

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let auth_service = state.auth_service.clone();
    let state = Arc::new(state);

    let protected = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(auth_service, require_auth));

    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/logout", post(logout_handler))
        .merge(protected)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
/// Register a new user and establish a session, exactly like login
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    tracing::info!("Registration attempt for email: {}", request.email);

    let session = state.auth_service.register(request).await?;

    tracing::info!("User registered: {}", session.user.id);

    let jar = jar.add(state.cookie_options.issue(session.refresh_token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            access_token: session.access_token,
            user: session.user,
        }),
    ))
}

/// POST /api/auth/login
/// Verify credentials and establish a session
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    tracing::info!("Login attempt for email: {}", request.email);

    let session = state.auth_service.login(request).await?;

    tracing::info!("User logged in: {}", session.user.id);

    let jar = jar.add(state.cookie_options.issue(session.refresh_token));

    Ok((
        jar,
        Json(SessionResponse {
            access_token: session.access_token,
            user: session.user,
        }),
    ))
}

/// POST /api/auth/refresh
/// Exchange the refresh cookie for a new access token. The cookie itself
/// is not rotated.
async fn refresh_handler(
    State(state): State<Arc<AuthApiState>>,
    jar: CookieJar,
) -> Result<Json<RefreshResponse>, RefreshError> {
    let token = jar
        .get(&state.cookie_options.name)
        .map(|c| c.value().to_string())
        .ok_or(RefreshError::Missing)?;

    tracing::debug!("Token refresh request");

    let access_token = state
        .auth_service
        .refresh(&token)
        .await
        .map_err(|e| match e {
            AuthError::Internal(detail) => RefreshError::Internal(detail),
            _ => RefreshError::Invalid,
        })?;

    Ok(Json(RefreshResponse { access_token }))
}

/// POST /api/auth/logout
/// Clear the refresh cookie. Succeeds regardless of prior auth state; an
/// already-issued access token stays valid until its own expiry.
async fn logout_handler(State(state): State<Arc<AuthApiState>>, jar: CookieJar) -> Response {
    tracing::info!("Logout request");

    let jar = jar.add(state.cookie_options.clear());

    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
        .into_response()
}

/// GET /api/auth/me
/// Return the identity resolved by the session gateway
async fn me_handler(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(user)
}
