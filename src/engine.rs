//! The activation state machine.
//!
//! A machine that already holds a seat is answered from a read-only snapshot
//! ([`LicenseStore::read_license`]) without queuing for the write lock.
//! Everything else runs inside one [`LicenseStore::with_license`] unit of
//! work, so the decision sequence below observes and commits a consistent view
//! of a single license:
//!
//! 1. load the license (unknown / inactive short-circuit)
//! 2. verify the key
//! 3. reject if the expiry window has passed, even for machines holding a seat
//! 4. return early, unchanged, if this machine already holds a seat
//! 5. count seats from the activation rows and reject when full
//! 6. on the first seat, fix `first_activation_at` and `expires_at`
//! 7. insert the activation

use std::sync::Arc;

use crate::clock::Clock;
use crate::crypto::verify_key;
use crate::error::{AppError, Result};
use crate::expiry::{compute_expiry, is_expired};
use crate::models::{ActivationKind, ActivationOutcome, License};
use crate::store::{LicenseStore, LicenseUnit};
use crate::util::redact_fingerprint;

pub struct ActivationEngine<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: LicenseStore> ActivationEngine<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn activate(
        &self,
        license_id: &str,
        raw_key: &str,
        machine_fingerprint: &str,
    ) -> Result<ActivationOutcome> {
        let license_id = license_id.trim();
        if license_id.is_empty() {
            return Err(AppError::Validation("license_id must not be empty".into()));
        }
        if machine_fingerprint.trim().is_empty() {
            return Err(AppError::Validation(
                "machine_fingerprint must not be empty".into(),
            ));
        }

        let result = self
            .store
            .read_license(license_id, |unit| {
                self.bound_seat(unit, license_id, raw_key, machine_fingerprint)
            })
            .and_then(|bound| match bound {
                Some(outcome) => Ok(outcome),
                None => self.store.with_license(license_id, |unit| {
                    self.decide(unit, license_id, raw_key, machine_fingerprint)
                }),
            });

        match &result {
            Ok(outcome) => tracing::info!(
                license_id,
                machine = %redact_fingerprint(machine_fingerprint),
                used_seats = outcome.used_seats,
                max_seats = outcome.max_seats,
                "{}",
                outcome.kind.message()
            ),
            Err(e) if e.is_infrastructure() => tracing::warn!(
                license_id,
                machine = %redact_fingerprint(machine_fingerprint),
                error = %e,
                "Activation aborted"
            ),
            Err(e) => tracing::debug!(
                license_id,
                machine = %redact_fingerprint(machine_fingerprint),
                code = e.code(),
                "Activation rejected"
            ),
        }

        result
    }

    /// Load the license and run the checks that apply to every caller:
    /// existence, active flag, key and expiry. Returns the license with the
    /// time the checks were made against.
    fn checked_license(
        &self,
        unit: &mut dyn LicenseUnit,
        license_id: &str,
        raw_key: &str,
    ) -> Result<(License, i64)> {
        let license = unit
            .load()?
            .ok_or_else(|| AppError::UnknownLicense(license_id.to_string()))?;

        if !license.active {
            return Err(AppError::InactiveLicense(license_id.to_string()));
        }

        if !verify_key(raw_key, &license.key_digest) {
            return Err(AppError::InvalidKey);
        }

        // Under the write lock in `decide`, so time order matches commit order.
        let now = self.clock.now();

        if is_expired(license.expires_at, now) {
            return Err(AppError::ExpiredLicense {
                expired_at: license.expires_at.unwrap_or(now),
            });
        }

        Ok((license, now))
    }

    /// Read-only pre-check: the already-activated answer, or `None` when the
    /// machine holds no seat and the caller must go through [`Self::decide`].
    fn bound_seat(
        &self,
        unit: &mut dyn LicenseUnit,
        license_id: &str,
        raw_key: &str,
        machine_fingerprint: &str,
    ) -> Result<Option<ActivationOutcome>> {
        let (license, _) = self.checked_license(unit, license_id, raw_key)?;
        existing_seat(unit, &license, machine_fingerprint)
    }

    fn decide(
        &self,
        unit: &mut dyn LicenseUnit,
        license_id: &str,
        raw_key: &str,
        machine_fingerprint: &str,
    ) -> Result<ActivationOutcome> {
        let (mut license, now) = self.checked_license(unit, license_id, raw_key)?;

        // Re-checked under the write lock; another call may have bound it since.
        if let Some(outcome) = existing_seat(unit, &license, machine_fingerprint)? {
            return Ok(outcome);
        }

        let used_seats = unit.count_activations(&license.id)?;

        if used_seats >= license.max_seats {
            return Err(AppError::SeatsExhausted {
                used: used_seats,
                max: license.max_seats,
            });
        }

        let kind = if license.first_activation_at.is_none() {
            license.first_activation_at = Some(now);
            license.expires_at = compute_expiry(license.duration_seconds, now);
            unit.save(&license)?;
            ActivationKind::FirstUse
        } else {
            ActivationKind::NewSeat
        };

        unit.insert_activation(&license.id, machine_fingerprint, now)?;

        Ok(ActivationOutcome {
            kind,
            expires_at: license.expires_at,
            duration_seconds: license.duration_seconds,
            max_seats: license.max_seats,
            used_seats: used_seats + 1,
        })
    }
}

fn existing_seat(
    unit: &mut dyn LicenseUnit,
    license: &License,
    machine_fingerprint: &str,
) -> Result<Option<ActivationOutcome>> {
    if unit
        .find_activation(&license.id, machine_fingerprint)?
        .is_none()
    {
        return Ok(None);
    }

    Ok(Some(ActivationOutcome {
        kind: ActivationKind::AlreadyActivated,
        expires_at: license.expires_at,
        duration_seconds: license.duration_seconds,
        max_seats: license.max_seats,
        used_seats: unit.count_activations(&license.id)?,
    }))
}
