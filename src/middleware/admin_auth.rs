use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::crypto::tokens_match;
use crate::db::AppState;
use crate::error::AppError;
use crate::util::extract_bearer_token;

/// Require `Authorization: Bearer {ADMIN_API_KEY}` on admin routes.
///
/// With no admin key configured, every admin request is rejected.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        tracing::warn!("Admin request rejected: ADMIN_API_KEY is not configured");
        return Err(AppError::Unauthorized);
    };

    let token = extract_bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    if !tokens_match(token, expected) {
        tracing::warn!(path = %request.uri().path(), "Admin request with invalid token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
