use serde::{Deserialize, Serialize};

use crate::util::redact_fingerprint;

/// A machine's claim on one seat of a license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub id: String,
    /// Surrogate key of the owning license row
    pub license_row_id: String,
    pub machine_fingerprint: String,
    pub activated_at: i64,
}

/// Activation joined with its license's external identifier.
#[derive(Debug, Clone)]
pub struct ActivationWithLicense {
    pub activation: Activation,
    pub license_id: String,
}

/// Human-facing projection of an activation. The fingerprint is redacted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivationRecord {
    pub license_id: String,
    pub machine: String,
    pub activated_at: i64,
}

impl From<&ActivationWithLicense> for ActivationRecord {
    fn from(row: &ActivationWithLicense) -> Self {
        Self {
            license_id: row.license_id.clone(),
            machine: redact_fingerprint(&row.activation.machine_fingerprint),
            activated_at: row.activation.activated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivateRequest {
    pub license_id: String,
    /// Optional in the body when sent as `Authorization: Bearer {key}`
    #[serde(default)]
    pub raw_key: Option<String>,
    pub machine_fingerprint: String,
}

/// How a successful activation call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKind {
    /// The license's first seat; the expiry window was fixed by this call
    FirstUse,
    /// A new seat on an already-activated license
    NewSeat,
    /// The machine already held a seat; nothing changed
    AlreadyActivated,
}

impl ActivationKind {
    pub fn message(&self) -> &'static str {
        match self {
            ActivationKind::FirstUse => "Activated (first use)",
            ActivationKind::NewSeat => "Activated",
            ActivationKind::AlreadyActivated => "Already activated on this machine",
        }
    }
}

/// Result of a successful activation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    pub kind: ActivationKind,
    pub expires_at: Option<i64>,
    pub duration_seconds: i64,
    pub max_seats: i64,
    pub used_seats: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivateResponse {
    pub ok: bool,
    pub message: String,
    pub expires_at: Option<i64>,
    pub duration_seconds: i64,
    pub max_seats: i64,
    pub used_seats: i64,
}

impl From<ActivationOutcome> for ActivateResponse {
    fn from(outcome: ActivationOutcome) -> Self {
        Self {
            ok: true,
            message: outcome.kind.message().to_string(),
            expires_at: outcome.expires_at,
            duration_seconds: outcome.duration_seconds,
            max_seats: outcome.max_seats,
            used_seats: outcome.used_seats,
        }
    }
}
