//! Expiry window computation.

/// Longest accepted license duration: 100 years of 365 days.
pub const MAX_DURATION_SECONDS: i64 = 100 * 365 * 86_400;

/// Compute when a license expires, given its duration and the instant of its
/// first activation. A duration of zero means the license is perpetual.
///
/// Saturates at `i64::MAX` rather than wrapping into the past.
pub fn compute_expiry(duration_seconds: i64, first_activation_at: i64) -> Option<i64> {
    if duration_seconds == 0 {
        None
    } else {
        Some(first_activation_at.saturating_add(duration_seconds))
    }
}

/// Whether a license with the given expiry has expired at `now`.
/// The boundary is inclusive: a license is expired at exactly `expires_at`.
pub fn is_expired(expires_at: Option<i64>, now: i64) -> bool {
    expires_at.is_some_and(|exp| now >= exp)
}
