//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors render through
//! `auth::AuthError`.

mod config;

use auth::{AuthAppState, MemoryCredentialStore, PgCredentialStore};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

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

    let config = ServerConfig::from_env()?;
    tracing::info!(
        runtime_env = %config.runtime_env,
        session_ttl_secs = config.auth.session_ttl_secs(),
        hash_workers = config.auth.hash_workers,
        "Configuration loaded"
    );

    let ServerConfig {
        bind_addr,
        database_url,
        frontend_origins,
        auth: auth_config,
        keys,
        ..
    } = config;

    let auth_routes = match database_url {
        Some(database_url) => {
            // Database connection
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

            let state = AuthAppState::new(PgCredentialStore::new(pool), auth_config, keys)?;
            auth::auth_router(state)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, identities are kept in memory only");
            let state = AuthAppState::new(MemoryCredentialStore::new(), auth_config, keys)?;
            auth::auth_router_generic(state)
        }
    };

    let app = app_router(auth_routes, frontend_origins);

    // Start server
    tracing::info!("Listening on {}", bind_addr);

    let listener = TcpListener::bind(bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Assemble the full application router
fn app_router(auth_routes: Router, frontend_origins: Vec<http::HeaderValue>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(frontend_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    Router::new()
        .nest("/api", auth_routes)
        .route("/app/health", get(health))
        .route("/app/health/cron_health_check", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Serialize)]
struct HealthResponse {
    success: bool,
}

/// Liveness check, also answers HEAD
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { success: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::{AuthConfig, TokenKeys};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use platform::password::HashCost;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = AuthConfig {
            hash_cost: HashCost::minimal(),
            ..AuthConfig::development()
        };
        let state =
            AuthAppState::new(MemoryCredentialStore::new(), config, TokenKeys::random()).unwrap();
        app_router(
            auth::auth_router_generic(state),
            vec!["http://localhost:9999".parse().unwrap()],
        )
    }

    #[tokio::test]
    async fn test_health_get() {
        let response = test_app()
            .oneshot(Request::get("/app/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_health_head() {
        for uri in ["/app/health", "/app/health/cron_health_check"] {
            let response = test_app()
                .oneshot(
                    Request::builder()
                        .method(Method::HEAD)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_auth_routes_nested_under_api() {
        let response = test_app()
            .oneshot(
                Request::post("/api/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"userName":"wiggle","password":"ABCdefghijklm123!@#"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = test_app()
            .oneshot(Request::get("/register").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let response = test_app()
            .oneshot(Request::get("/api/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
