pub mod admin;
pub mod public;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::RateLimitConfig;
use crate::db::AppState;

/// Build the full application router.
pub fn app(state: AppState, rate_limit: RateLimitConfig) -> Router {
    Router::new()
        // Public endpoints (license key auth per request)
        .merge(public::router(rate_limit))
        // Admin API (admin bearer token)
        .merge(admin::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
