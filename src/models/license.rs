use serde::{Deserialize, Serialize};

/// A stored license record.
///
/// Only the digest of the secret key is kept. `first_activation_at` and
/// `expires_at` are set together, once, when the first seat is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    /// Surrogate row key (`sk_lic_...`)
    pub id: String,
    /// Externally chosen, human-readable identifier
    pub license_id: String,
    pub key_digest: String,
    /// 0 = perpetual
    pub duration_seconds: i64,
    pub max_seats: i64,
    pub first_activation_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub active: bool,
    pub created_at: i64,
}

/// Validated input for inserting a new license.
#[derive(Debug, Clone)]
pub struct NewLicense {
    pub license_id: String,
    pub key_digest: String,
    pub duration_seconds: i64,
    pub max_seats: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateLicense {
    pub license_id: String,
    pub raw_key: String,
    /// 0 = perpetual
    pub duration_seconds: i64,
    pub max_seats: i64,
}

/// Read-only projection of a license for listings. Never carries the key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LicenseSummary {
    pub license_id: String,
    pub duration_seconds: i64,
    pub max_seats: i64,
    /// Counted from activation records, not a stored counter
    pub used_seats: i64,
    pub first_activation_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub active: bool,
    pub created_at: i64,
}

impl LicenseSummary {
    pub fn from_license(license: &License, used_seats: i64) -> Self {
        Self {
            license_id: license.license_id.clone(),
            duration_seconds: license.duration_seconds,
            max_seats: license.max_seats,
            used_seats,
            first_activation_at: license.first_activation_at,
            expires_at: license.expires_at,
            active: license.active,
            created_at: license.created_at,
        }
    }
}
