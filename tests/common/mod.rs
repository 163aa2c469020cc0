//! Test utilities and fixtures for Seatkeep integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub use seatkeep::clock::{Clock, ManualClock};
pub use seatkeep::config::RateLimitConfig;
pub use seatkeep::crypto::hash_key;
pub use seatkeep::db::{AppState, DbPool, create_pool, init_db, queries};
pub use seatkeep::engine::ActivationEngine;
pub use seatkeep::error::AppError;
pub use seatkeep::handlers;
pub use seatkeep::models::*;
pub use seatkeep::store::{LicenseStore, LicenseUnit, MemoryStore};

pub const ADMIN_KEY: &str = "test-admin-key";

/// Fixed start time for the manual clock (2023-11-14T22:13:20Z)
pub const T0: i64 = 1_700_000_000;
pub const ONE_HOUR: i64 = 3600;
pub const ONE_DAY: i64 = 86400;

/// A SQLite-backed app state on a throwaway database file.
///
/// A file (not `:memory:`) is used so every pooled connection sees the same
/// database, which the concurrency tests depend on.
pub struct TestContext {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_admin_key(Some(ADMIN_KEY.to_string()))
    }

    pub fn with_admin_key(admin_api_key: Option<String>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("seatkeep-test.db");
        let pool = create_pool(path.to_str().expect("temp path should be UTF-8"))
            .expect("Failed to create pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            init_db(&conn).expect("Failed to initialize schema");
        }

        let clock = Arc::new(ManualClock::new(T0));
        let state = AppState::new(pool, clock.clone(), admin_api_key);

        Self {
            state,
            clock,
            _dir: dir,
        }
    }

    /// Full router with rate limiting disabled.
    pub fn app(&self) -> Router {
        handlers::app(self.state.clone(), no_rate_limits())
    }

    pub fn create_license(
        &self,
        license_id: &str,
        raw_key: &str,
        duration_seconds: i64,
        max_seats: i64,
    ) -> License {
        self.state
            .registry
            .create(&CreateLicense {
                license_id: license_id.to_string(),
                raw_key: raw_key.to_string(),
                duration_seconds,
                max_seats,
            })
            .expect("Failed to create test license")
    }

    pub fn license(&self, license_id: &str) -> License {
        let conn = self.state.db.get().unwrap();
        queries::get_license_by_license_id(&conn, license_id)
            .unwrap()
            .expect("license should exist")
    }

    pub fn seat_count(&self, license_id: &str) -> i64 {
        let license = self.license(license_id);
        let conn = self.state.db.get().unwrap();
        queries::count_activations_for_license(&conn, &license.id).unwrap()
    }
}

pub fn no_rate_limits() -> RateLimitConfig {
    RateLimitConfig {
        activate_rpm: 0,
        relaxed_rpm: 0,
    }
}

/// An activation engine over the in-memory store, driven by a manual clock.
pub fn memory_engine() -> (ActivationEngine<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let engine = ActivationEngine::new(MemoryStore::new(), clock.clone());
    (engine, clock)
}

pub fn insert_memory_license(
    engine: &ActivationEngine<MemoryStore>,
    license_id: &str,
    raw_key: &str,
    duration_seconds: i64,
    max_seats: i64,
) -> License {
    engine
        .store()
        .insert_license(
            &NewLicense {
                license_id: license_id.to_string(),
                key_digest: hash_key(raw_key),
                duration_seconds,
                max_seats,
            },
            T0,
        )
        .expect("Failed to insert license")
}

// ============================================================================
// Request helpers
// ============================================================================

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn activate_request(license_id: &str, raw_key: &str, machine: &str) -> Request<Body> {
    json_request(
        "POST",
        "/activate",
        &serde_json::json!({
            "license_id": license_id,
            "raw_key": raw_key,
            "machine_fingerprint": machine,
        }),
    )
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", ADMIN_KEY))
        .body(Body::empty())
        .unwrap()
}

pub fn admin_post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", ADMIN_KEY))
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Send a request and decode the response body as JSON (Null when empty).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("Response should be valid JSON")
    };
    (status, json)
}
