mod activate;

pub use activate::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::db::AppState;
use crate::rate_limit;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(limits: RateLimitConfig) -> Router<AppState> {
    let activate = rate_limit::limit(
        Router::new().route("/activate", post(activate_license)),
        limits.activate_rpm,
    );
    let relaxed = rate_limit::limit(
        Router::new().route("/health", get(health)),
        limits.relaxed_rpm,
    );

    Router::new().merge(activate).merge(relaxed)
}
