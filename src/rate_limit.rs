//! Per-IP rate limiting for public endpoints.
//!
//! Tiers:
//! - Activate: POST /activate (key hashing + a write transaction per call)
//! - Relaxed: GET /health
//!
//! Configure via RATE_LIMIT_ACTIVATE_RPM and RATE_LIMIT_RELAXED_RPM.
//! A value of 0 turns the tier off, which tests rely on.
//!
//! Keys are the peer IP, so the server must be run with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;

use crate::db::AppState;

/// Wrap `router` in a limiter allowing `requests_per_minute` per client IP.
pub fn limit(router: Router<AppState>, requests_per_minute: u32) -> Router<AppState> {
    if requests_per_minute == 0 {
        return router;
    }

    let period_ms = 60_000 / u64::from(requests_per_minute);
    let Some(config) = GovernorConfigBuilder::default()
        .period(Duration::from_millis(period_ms.max(1)))
        .burst_size(requests_per_minute)
        .finish()
    else {
        tracing::warn!(
            requests_per_minute,
            "Invalid rate limit configuration, limiter disabled"
        );
        return router;
    };

    router.layer(GovernorLayer::<_, _, Body>::new(Arc::new(config)))
}
