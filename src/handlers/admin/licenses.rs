use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{CreateLicense, LicenseSummary};
use crate::pagination::{Paginated, PaginationQuery};

/// POST /admin/licenses
pub async fn create_license(
    State(state): State<AppState>,
    Json(input): Json<CreateLicense>,
) -> Result<(StatusCode, Json<LicenseSummary>)> {
    let registry = state.registry.clone();
    let license = tokio::task::spawn_blocking(move || registry.create(&input))
        .await
        .map_err(|e| AppError::Internal(format!("Create task failed: {}", e)))??;

    Ok((
        StatusCode::CREATED,
        Json(LicenseSummary::from_license(&license, 0)),
    ))
}

/// GET /admin/licenses
pub async fn list_licenses(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Paginated<LicenseSummary>>> {
    let conn = state.db.get()?;
    let page = query.page();
    let (items, total) = queries::list_license_summaries_paginated(&conn, page.limit, page.offset)?;
    Ok(Json(Paginated::new(items, total, page)))
}

#[derive(Debug, Serialize)]
pub struct LicenseIdsResponse {
    pub license_ids: Vec<String>,
}

/// GET /admin/licenses/ids
pub async fn list_license_ids(State(state): State<AppState>) -> Result<Json<LicenseIdsResponse>> {
    let conn = state.db.get()?;
    let license_ids = queries::list_license_ids(&conn)?;
    Ok(Json(LicenseIdsResponse { license_ids }))
}

#[derive(Debug, Serialize)]
pub struct LicenseExistsResponse {
    pub license_id: String,
    pub exists: bool,
}

/// GET /admin/licenses/{license_id}/exists
///
/// The ID is trimmed the same way create and activate trim it.
pub async fn license_exists(
    State(state): State<AppState>,
    Path(license_id): Path<String>,
) -> Result<Json<LicenseExistsResponse>> {
    let license_id = license_id.trim().to_string();
    let conn = state.db.get()?;
    let exists = queries::license_exists(&conn, &license_id)?;
    Ok(Json(LicenseExistsResponse { license_id, exists }))
}
