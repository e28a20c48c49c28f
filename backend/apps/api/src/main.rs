//! API Server Entry Point
//!
//! Composition root: reads configuration from the environment, constructs
//! every component explicitly (no service locator), and serves the router.
//! Uses `anyhow` for startup errors; request-path errors are the typed
//! ones defined in the `auth` crate.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth::{AuthConfig, DenylistOutagePolicy, PgUserStore, RedisTokenDenylist, api_router};
use axum::http::{Method, header};
use platform::token::TokenCodec;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;

    // Fails fast on a missing or weak secret
    let codec = TokenCodec::new(&config.jwt_secret, config.token_validity)?;

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Denylist store connection
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let redis_client = redis::Client::open(redis_url)?;
    let redis_conn = ConnectionManager::new(redis_client).await?;

    tracing::info!(policy = ?config.denylist_outage, "Connected to denylist store");

    let store = PgUserStore::new(pool);
    let denylist = RedisTokenDenylist::new(
        redis_conn,
        config.denylist_key_prefix.clone(),
        config.denylist_outage,
    );

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<axum::http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = api_router(
        Arc::new(store),
        Arc::new(denylist),
        Arc::new(codec),
        Arc::new(config),
    )
    .layer(TraceLayer::new_for_http())
    .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble [`AuthConfig`] from the environment.
///
/// `JWT_SECRET` is mandatory; everything else has a default.
fn load_config() -> anyhow::Result<AuthConfig> {
    let jwt_secret = env::var("JWT_SECRET")
        .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set in environment"))?
        .into_bytes();

    let token_validity = match env::var("JWT_VALIDITY_MS") {
        Ok(ms) => Duration::from_millis(ms.parse()?),
        Err(_) => Duration::from_millis(3_600_000),
    };

    let max_failed_attempts = match env::var("AUTH_MAX_FAILED_ATTEMPTS") {
        Ok(n) => n.parse()?,
        Err(_) => 5,
    };

    let denylist_key_prefix =
        env::var("DENYLIST_KEY_PREFIX").unwrap_or_else(|_| "blacklist:jwt:".to_string());

    // The deployment must pick an outage behavior; the default is the
    // conservative one.
    let denylist_outage = match env::var("DENYLIST_FAIL_OPEN").as_deref() {
        Ok("true") | Ok("1") => DenylistOutagePolicy::FailOpen,
        _ => DenylistOutagePolicy::FailClosed,
    };

    Ok(AuthConfig {
        jwt_secret,
        token_validity,
        max_failed_attempts,
        denylist_key_prefix,
        denylist_outage,
    })
}
