mod activations;
mod licenses;

pub use activations::*;
pub use licenses::*;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::db::AppState;
use crate::middleware::require_admin;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/licenses", post(create_license).get(list_licenses))
        .route("/admin/licenses/ids", get(list_license_ids))
        .route("/admin/licenses/{license_id}/exists", get(license_exists))
        .route("/admin/activations", get(list_activations))
        .layer(middleware::from_fn_with_state(state, require_admin))
}
