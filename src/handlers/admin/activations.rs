use axum::extract::State;
use serde::Deserialize;

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::{Json, Query};
use crate::models::ActivationRecord;
use crate::pagination::{Page, Paginated};

#[derive(Debug, Deserialize, Default)]
pub struct ListActivationsQuery {
    /// Only activations of this license
    #[serde(default)]
    pub license_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// GET /admin/activations
///
/// Fingerprints are redacted; the full value never leaves the store.
pub async fn list_activations(
    State(state): State<AppState>,
    Query(query): Query<ListActivationsQuery>,
) -> Result<Json<Paginated<ActivationRecord>>> {
    let conn = state.db.get()?;
    let page = Page::new(query.limit, query.offset);
    let (rows, total) = queries::list_activations_paginated(
        &conn,
        query.license_id.as_deref(),
        page.limit,
        page.offset,
    )?;

    let items = rows.iter().map(ActivationRecord::from).collect();
    Ok(Json(Paginated::new(items, total, page)))
}
