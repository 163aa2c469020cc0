use axum::{extract::State, http::HeaderMap};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::{ActivateRequest, ActivateResponse};
use crate::util::extract_bearer_token;

/// POST /activate
///
/// Claims a seat for `machine_fingerprint` on `license_id`, or confirms the
/// seat it already holds.
///
/// The raw key can be provided via:
/// - Authorization header: `Authorization: Bearer {key}`
/// - Request body: `{"raw_key": "..."}`
///
/// Header takes precedence if both are provided.
pub async fn activate_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>> {
    let raw_key = extract_bearer_token(&headers)
        .map(String::from)
        .or(body.raw_key)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            AppError::Validation(
                "License key required. Provide via Authorization header (Bearer {key}) or raw_key."
                    .into(),
            )
        })?;

    // The unit of work blocks on SQLite's write lock; keep it off the async workers.
    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.activate(&body.license_id, &raw_key, &body.machine_fingerprint)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Activation task failed: {}", e)))??;

    Ok(Json(outcome.into()))
}
