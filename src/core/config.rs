//! Application configuration from environment variables.
//!
//! The configuration is loaded exactly once at startup (after
//! `dotenvy::dotenv()`) and passed by reference into the services that need
//! it. Request handlers never read the environment directly.

/// Default access token lifetime (minutes)
const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;

/// Default refresh token lifetime (days)
const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Default HTTP port
const DEFAULT_PORT: u16 = 5000;

/// Default name of the refresh token cookie
const DEFAULT_COOKIE_NAME: &str = "task_auth_refresh";

/// Origin always allowed during local development
const DEV_ORIGIN: &str = "http://localhost:5173";

/// Host suffix for Vercel preview deployments, allowed in addition to the
/// explicit whitelist
const VERCEL_PREVIEW_SUFFIX: &str = ".vercel.app";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable not set")]
    MissingJwtSecret,

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Immutable application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Port the HTTP server binds to
    pub port: u16,

    /// Secret key for signing JWTs. Required: tokens are never issued
    /// unsigned or with a default key.
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,

    /// Name of the http-only refresh token cookie
    pub cookie_name: String,

    /// Production mode: drives the cookie `Secure` flag and `SameSite`
    /// policy
    pub production: bool,

    /// Origins allowed by CORS (the SPA is served from a separate origin)
    pub frontend_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing `JWT_SECRET` or `DATABASE_URL` is a fatal startup error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?;
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let access_ttl = std::env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ACCESS_TTL_MINUTES);

        let refresh_ttl = std::env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REFRESH_TTL_DAYS);

        let cookie_name =
            std::env::var("COOKIE_NAME").unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string());

        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let frontend_origins = parse_origins(std::env::var("FRONTEND_ORIGINS").ok().as_deref());

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            access_token_ttl_minutes: access_ttl,
            refresh_token_ttl_days: refresh_ttl,
            cookie_name,
            production,
            frontend_origins,
        })
    }

    /// Set the access token lifetime
    pub fn access_token_ttl(mut self, minutes: i64) -> Self {
        self.access_token_ttl_minutes = minutes;
        self
    }

    /// Set the refresh token lifetime
    pub fn refresh_token_ttl(mut self, days: i64) -> Self {
        self.refresh_token_ttl_days = days;
        self
    }

    /// Set production mode
    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Check whether a CORS origin is allowed: an exact whitelist match,
    /// or any Vercel preview deployment (*.vercel.app)
    pub fn origin_allowed(&self, origin: &str) -> bool {
        if self.frontend_origins.iter().any(|o| o == origin) {
            return true;
        }

        origin_host(origin).is_some_and(|host| host.ends_with(VERCEL_PREVIEW_SUFFIX))
    }
}

/// Extract the host from an origin string like `https://app.example.com`
fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))?;

    rest.split(['/', ':']).next().filter(|h| !h.is_empty())
}

/// Parse a comma-separated origin whitelist, always including the local
/// development origin.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let mut list: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if !list.iter().any(|o| o == DEV_ORIGIN) {
        list.insert(0, DEV_ORIGIN.to_string());
    }

    list
}
