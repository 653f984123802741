//! Authentication service
//!
//! Business logic for user registration, login, access token refresh and
//! session resolution. Tokens are stateless: nothing is stored server-side,
//! so logout is purely a client-cookie concern handled at the API layer.

use crate::core::auth::jwt::{JwtError, JwtService};
use crate::core::db::models::UserResponse;
use crate::core::db::repositories::{UserRepository, UserRepositoryError};

/// Authentication service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing fields")]
    MissingFields,

    #[error("Email already registered")]
    EmailTaken,

    /// Unknown email and wrong password collapse into this one variant so
    /// the two causes are indistinguishable to the client.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed, expired, badly signed and wrong-kind tokens all collapse
    /// into this one variant.
    #[error("Token invalid")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserRepositoryError> for AuthError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound => AuthError::UserNotFound,
            UserRepositoryError::EmailAlreadyExists => AuthError::EmailTaken,
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match &err {
            // Only signing failures are a server fault; every validation
            // failure is the client's token being bad
            JwtError::EncodingError(_) => AuthError::Internal(err.to_string()),
            _ => AuthError::InvalidToken,
        }
    }
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// An established session: the user's public fields plus both tokens.
/// The API layer puts the access token in the response body and the
/// refresh token in the http-only cookie.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_service: JwtService,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(user_repo: UserRepository, jwt_service: JwtService) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    fn establish_session(&self, user: UserResponse) -> Result<AuthSession, AuthError> {
        let (access_token, _) = self.jwt_service.generate_access_token(user.id)?;
        let (refresh_token, _) = self.jwt_service.generate_refresh_token(user.id)?;

        Ok(AuthSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Register a new user. Registration auto-authenticates: the returned
    /// session is identical to what login would produce.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        if request.name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        let user = self
            .user_repo
            .create(&request.name, &request.email, &request.password)
            .await?;

        self.establish_session(user.into())
    }

    /// Login an existing user
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AuthError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let user = self
            .user_repo
            .authenticate(&request.email, &request.password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.establish_session(user.into())
    }

    /// Exchange a valid refresh token for a new access token. The refresh
    /// token itself is not rotated and stays valid until its own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.jwt_service.validate_refresh_token(refresh_token)?;

        // The account may have been deleted since the token was issued
        let user_id = claims.user_id()?;
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let (access_token, _) = self.jwt_service.generate_access_token(user_id)?;

        Ok(access_token)
    }

    /// Resolve an access token to the user's public identity. Used by the
    /// session gateway before any protected handler runs.
    pub async fn resolve_access_token(&self, token: &str) -> Result<UserResponse, AuthError> {
        let claims = self.jwt_service.validate_access_token(token)?;

        let user_id = claims.user_id()?;
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Error Conversion Tests
    // ========================================================================

    #[test]
    fn test_auth_error_display() {
        assert_eq!(format!("{}", AuthError::MissingFields), "Missing fields");
        assert_eq!(
            format!("{}", AuthError::EmailTaken),
            "Email already registered"
        );
        assert_eq!(
            format!("{}", AuthError::InvalidCredentials),
            "Invalid credentials"
        );
        assert_eq!(format!("{}", AuthError::InvalidToken), "Token invalid");
        assert_eq!(format!("{}", AuthError::UserNotFound), "User not found");
    }

    #[test]
    fn test_auth_error_from_user_repository_error() {
        let err: AuthError = UserRepositoryError::NotFound.into();
        assert!(matches!(err, AuthError::UserNotFound));

        let err: AuthError = UserRepositoryError::EmailAlreadyExists.into();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn test_auth_error_from_jwt_error_is_uniform() {
        // Expired, malformed and wrong-kind must be indistinguishable
        let expired: AuthError = JwtError::Expired.into();
        let invalid: AuthError = JwtError::InvalidToken.into();
        let wrong_kind: AuthError = JwtError::InvalidTokenType.into();

        assert!(matches!(expired, AuthError::InvalidToken));
        assert!(matches!(invalid, AuthError::InvalidToken));
        assert!(matches!(wrong_kind, AuthError::InvalidToken));
        assert_eq!(expired.to_string(), invalid.to_string());
        assert_eq!(invalid.to_string(), wrong_kind.to_string());
    }

    #[test]
    fn test_malformed_token_is_client_error() {
        // A token with garbage segments must map to the uniform invalid
        // token error, never to an internal (500-class) one
        use crate::core::auth::jwt::JwtService;
        use crate::core::config::AppConfig;

        let service = JwtService::new(&AppConfig {
            database_url: "postgres://localhost/taskboard_test".to_string(),
            port: 5000,
            jwt_secret: "test_secret_key_for_testing_only_32bytes!".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            cookie_name: "task_auth_refresh".to_string(),
            production: false,
            frontend_origins: vec![],
        });

        let jwt_err = service.validate_token("a.b.c").unwrap_err();
        let err: AuthError = jwt_err.into();

        assert!(matches!(err, AuthError::InvalidToken));
        assert_eq!(err.to_string(), "Token invalid");
    }

    // ========================================================================
    // Request Deserialization Tests
    // ========================================================================

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{
            "name": "Ann",
            "email": "ann@x.com",
            "password": "secret123"
        }"#;

        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Ann");
        assert_eq!(request.email, "ann@x.com");
        assert_eq!(request.password, "secret123");
    }

    #[test]
    fn test_register_request_missing_fields_default_empty() {
        // Missing keys deserialize to empty strings and are rejected by the
        // service's presence check rather than by a 422 from the extractor
        let request: RegisterRequest = serde_json::from_str(r#"{"name": "Ann"}"#).unwrap();

        assert_eq!(request.name, "Ann");
        assert!(request.email.is_empty());
        assert!(request.password.is_empty());
    }

    #[test]
    fn test_login_request_deserialization() {
        let json = r#"{
            "email": "ann@x.com",
            "password": "secret123"
        }"#;

        let request: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "ann@x.com");
        assert_eq!(request.password, "secret123");
    }
}
