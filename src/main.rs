use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use taskboard::core::auth::{AuthApiState, AuthService, JwtService, RefreshCookieOptions, auth_api_router};
use taskboard::core::config::AppConfig;
use taskboard::core::db::pool::{DbConfig, create_pool_with_migrations, health_check};
use taskboard::core::db::repositories::{TaskRepository, UserRepository};
use taskboard::core::tasks::{TaskApiState, task_api_router};

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load application config from environment variables. A missing JWT
    // secret or database URL is fatal: the server never starts with
    // unsigned tokens or no storage.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let env_name = if config.production {
        "production"
    } else {
        "development"
    };
    tracing::info!(
        "Config loaded: env={}, port={}, cookie={}, origins={:?}",
        env_name,
        config.port,
        config.cookie_name,
        config.frontend_origins
    );

    // Connect to PostgreSQL and apply pending migrations
    let pool = match create_pool_with_migrations(&DbConfig::new(config.database_url.clone())).await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database error: {}", e);
            std::process::exit(1);
        }
    };

    // Wire up repositories and services
    let user_repo = UserRepository::new(pool.clone());
    let task_repo = TaskRepository::new(pool.clone());
    let jwt_service = JwtService::new(&config);
    let auth_service = AuthService::new(user_repo, jwt_service);

    let auth_api = auth_api_router(AuthApiState {
        auth_service: auth_service.clone(),
        cookie_options: RefreshCookieOptions::from_config(&config),
    });
    let task_api = task_api_router(TaskApiState { task_repo }, auth_service);

    // The SPA lives on a separate origin and sends the refresh cookie
    // cross-site, so CORS must name origins explicitly and allow
    // credentials (a wildcard origin is rejected by browsers when
    // credentials are on). Besides the exact whitelist, Vercel preview
    // deployments are allowed by host suffix.
    let cors_config = config.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| cors_config.origin_allowed(origin))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Root route doubles as a liveness probe: `ok` reflects database
    // reachability
    let health_pool = pool.clone();
    let app = Router::new()
        .route(
            "/",
            get(move || {
                let pool = health_pool.clone();
                async move {
                    let ok = health_check(&pool).await.is_ok();
                    Json(json!({ "ok": ok, "env": env_name }))
                }
            }),
        )
        .merge(auth_api)
        .merge(task_api)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
