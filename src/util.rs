//! Shared helpers for request handling and human-facing projections.

use axum::http::HeaderMap;

/// Number of leading fingerprint characters kept visible when redacting.
const FINGERPRINT_VISIBLE_CHARS: usize = 8;

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Redact a machine fingerprint for listings and logs.
///
/// Keeps the first 8 characters followed by `...`. Short fingerprints are
/// masked entirely, since their prefix would be the whole value.
pub fn redact_fingerprint(fingerprint: &str) -> String {
    if fingerprint.chars().count() <= FINGERPRINT_VISIBLE_CHARS {
        return "***".to_string();
    }
    let visible: String = fingerprint.chars().take(FINGERPRINT_VISIBLE_CHARS).collect();
    format!("{}...", visible)
}
