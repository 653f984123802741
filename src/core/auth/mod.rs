//! Authentication module for Taskboard
//!
//! This module provides authentication functionality including:
//! - JWT token generation and validation
//! - User registration and login
//! - Session management with an http-only refresh cookie
//! - Request gateway middleware for protected routes
//! - REST API endpoints for auth operations

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod service;

pub use api::{AuthApiState, RefreshCookieOptions, auth_api_router};
pub use jwt::{Claims, JwtError, JwtService, TokenType};
pub use middleware::{CurrentUser, require_auth};
pub use service::{AuthError, AuthService, AuthSession, LoginRequest, RegisterRequest};
