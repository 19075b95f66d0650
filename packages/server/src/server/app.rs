//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    cancel_swap_handler, get_story_handler, get_swap_handler, health_handler,
    list_member_swaps_handler, publish_story_handler, request_unlock_handler,
    retry_swap_handler, review_queue_handler, swap_stats_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
    /// Present when running against Postgres; used by the health check
    pub db_pool: Option<PgPool>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
///
/// An empty `allowed_origins` allows any origin (development).
pub fn build_app(deps: ServerDeps, db_pool: Option<PgPool>, allowed_origins: &[String]) -> Router {
    let jwt_service = deps.jwt_service.clone();
    let app_state = AppState { deps, db_pool };

    Router::new()
        .route("/api/stories", post(publish_story_handler))
        .route("/api/stories/:id", get(get_story_handler))
        .route("/api/stories/:id/unlock", post(request_unlock_handler))
        .route("/api/swaps/stats", get(swap_stats_handler))
        .route("/api/swaps/review-queue", get(review_queue_handler))
        .route(
            "/api/swaps/:id",
            get(get_swap_handler).delete(cancel_swap_handler),
        )
        .route("/api/swaps/:id/retry", post(retry_swap_handler))
        .route("/api/members/:id/swaps", get(list_member_swaps_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
