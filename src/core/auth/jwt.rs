//! JWT utilities for token generation and validation
//!
//! Provides JWT token creation and validation using HS256. Access tokens
//! are short-lived (minutes), refresh tokens are long-lived (days). The
//! token kind is embedded in the claims and enforced at validation time so
//! a refresh token can never be replayed as an access token, or vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::AppConfig;

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid token type")]
    InvalidTokenType,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        // Every decode failure except expiry (bad signature, garbage
        // segments, wrong algorithm, truncated base64) is just an invalid
        // token; callers must not be able to tell them apart
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::InvalidToken,
        }
    }
}

/// Token kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Token kind (access or refresh)
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Check if this is an access token
    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access
    }

    /// Check if this is a refresh token
    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenType::Refresh
    }

    /// Get user ID as UUID
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

impl JwtService {
    /// Create a new JWT service from the application configuration
    pub fn new(config: &AppConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: config.access_token_ttl_minutes,
            refresh_ttl_days: config.refresh_token_ttl_days,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<(String, i64), JwtError> {
        self.generate(
            user_id,
            TokenType::Access,
            Duration::minutes(self.access_ttl_minutes),
        )
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<(String, i64), JwtError> {
        self.generate(
            user_id,
            TokenType::Refresh,
            Duration::days(self.refresh_ttl_days),
        )
    }

    fn generate(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, exp.timestamp()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        // Strict expiration checking
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Validate an access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;

        if !claims.is_access_token() {
            return Err(JwtError::InvalidTokenType);
        }

        Ok(claims)
    }

    /// Validate a refresh token specifically
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;

        if !claims.is_refresh_token() {
            return Err(JwtError::InvalidTokenType);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;

    fn test_config(secret: &str) -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/taskboard_test".to_string(),
            port: 5000,
            jwt_secret: secret.to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            cookie_name: "task_auth_refresh".to_string(),
            production: false,
            frontend_origins: vec![],
        }
    }

    fn create_test_service() -> JwtService {
        JwtService::new(&test_config("test_secret_key_for_testing_only_32bytes!"))
    }

    // ========================================================================
    // Token Type Tests
    // ========================================================================

    #[test]
    fn test_token_type_display() {
        assert_eq!(TokenType::Access.to_string(), "access");
        assert_eq!(TokenType::Refresh.to_string(), "refresh");
    }

    #[test]
    fn test_token_type_serialization() {
        let access_json = serde_json::to_string(&TokenType::Access).unwrap();
        let refresh_json = serde_json::to_string(&TokenType::Refresh).unwrap();

        assert_eq!(access_json, r#""access""#);
        assert_eq!(refresh_json, r#""refresh""#);
    }

    #[test]
    fn test_token_type_deserialization() {
        let access: TokenType = serde_json::from_str(r#""access""#).unwrap();
        let refresh: TokenType = serde_json::from_str(r#""refresh""#).unwrap();

        assert_eq!(access, TokenType::Access);
        assert_eq!(refresh, TokenType::Refresh);
    }

    // ========================================================================
    // JWT Service Tests
    // ========================================================================

    #[test]
    fn test_generate_access_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, exp) = service.generate_access_token(user_id).unwrap();

        assert!(!token.is_empty());
        assert!(exp > Utc::now().timestamp());
    }

    #[test]
    fn test_generate_refresh_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, exp) = service.generate_refresh_token(user_id).unwrap();

        assert!(!token.is_empty());
        assert!(exp > Utc::now().timestamp());
    }

    #[test]
    fn test_refresh_outlives_access() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (access, access_exp) = service.generate_access_token(user_id).unwrap();
        let (refresh, refresh_exp) = service.generate_refresh_token(user_id).unwrap();

        assert_ne!(access, refresh);
        assert!(refresh_exp > access_exp);
    }

    #[test]
    fn test_validate_access_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, _) = service.generate_access_token(user_id).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.is_access_token());
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_validate_refresh_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (token, _) = service.generate_refresh_token(user_id).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.is_refresh_token());
    }

    #[test]
    fn test_validate_access_token_with_refresh_token_fails() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (refresh_token, _) = service.generate_refresh_token(user_id).unwrap();

        let result = service.validate_access_token(&refresh_token);
        assert!(matches!(result, Err(JwtError::InvalidTokenType)));
    }

    #[test]
    fn test_validate_refresh_token_with_access_token_fails() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let (access_token, _) = service.generate_access_token(user_id).unwrap();

        let result = service.validate_refresh_token(&access_token);
        assert!(matches!(result, Err(JwtError::InvalidTokenType)));
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = create_test_service();

        let result = service.validate_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_malformed_segments() {
        // Tokens whose segments are not even valid base64 must fail the
        // same way as any other bad token, never as a distinct error
        let service = create_test_service();

        for garbage in ["a.b.c", "....", "not-a-jwt-at-all", ""] {
            let result = service.validate_token(garbage);
            assert!(
                matches!(result, Err(JwtError::InvalidToken)),
                "expected InvalidToken for {:?}, got: {:?}",
                garbage,
                result
            );
        }
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let service1 = JwtService::new(&test_config("secret_one"));
        let service2 = JwtService::new(&test_config("secret_two"));

        let (token, _) = service1.generate_access_token(Uuid::new_v4()).unwrap();

        let result = service2.validate_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        // Negative TTL ensures the token is already expired when validated
        let config =
            test_config("test_secret_key_for_testing_only_32bytes!").access_token_ttl(-1);
        let service = JwtService::new(&config);

        let (token, _) = service.generate_access_token(Uuid::new_v4()).unwrap();

        let result = service.validate_token(&token);
        assert!(
            matches!(result, Err(JwtError::Expired)),
            "Expected Expired error, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_valid_before_expiry() {
        // A one-minute token validated immediately is well inside its window
        let config = test_config("test_secret_key_for_testing_only_32bytes!").access_token_ttl(1);
        let service = JwtService::new(&config);

        let (token, _) = service.generate_access_token(Uuid::new_v4()).unwrap();

        assert!(service.validate_access_token(&token).is_ok());
    }

    #[test]
    fn test_claims_user_id_not_a_uuid() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            token_type: TokenType::Access,
            iat: 0,
            exp: 0,
        };

        assert!(matches!(claims.user_id(), Err(JwtError::InvalidToken)));
    }

    // ========================================================================
    // Error Tests
    // ========================================================================

    #[test]
    fn test_jwt_error_display() {
        assert_eq!(format!("{}", JwtError::Expired), "Token expired");
        assert_eq!(format!("{}", JwtError::InvalidToken), "Invalid token");
        assert_eq!(
            format!("{}", JwtError::InvalidTokenType),
            "Invalid token type"
        );
    }
}
