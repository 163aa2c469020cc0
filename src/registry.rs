//! License creation.

use std::sync::Arc;

use crate::clock::Clock;
use crate::crypto::hash_key;
use crate::error::{AppError, Result};
use crate::expiry::MAX_DURATION_SECONDS;
use crate::models::{CreateLicense, License, NewLicense};
use crate::store::LicenseStore;

const MAX_LICENSE_ID_LEN: usize = 128;

pub struct LicenseRegistry<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: LicenseStore> LicenseRegistry<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a license with no activations. The raw key is hashed and dropped.
    pub fn create(&self, input: &CreateLicense) -> Result<License> {
        let new = validate(input)?;

        if self.store.license_exists(&new.license_id)? {
            return Err(AppError::DuplicateLicense(new.license_id));
        }

        // The store's unique constraint still rejects a concurrent create that
        // slips past the existence check above.
        let license = self.store.insert_license(&new, self.clock.now())?;

        tracing::info!(
            license_id = %license.license_id,
            duration_seconds = license.duration_seconds,
            max_seats = license.max_seats,
            "License created"
        );
        Ok(license)
    }
}

fn validate(input: &CreateLicense) -> Result<NewLicense> {
    let license_id = input.license_id.trim();
    if license_id.is_empty() {
        return Err(AppError::Validation("license_id must not be empty".into()));
    }
    if license_id.len() > MAX_LICENSE_ID_LEN {
        return Err(AppError::Validation(format!(
            "license_id must be at most {} bytes",
            MAX_LICENSE_ID_LEN
        )));
    }
    if input.raw_key.is_empty() {
        return Err(AppError::Validation("raw_key must not be empty".into()));
    }
    if input.duration_seconds < 0 {
        return Err(AppError::Validation(
            "duration_seconds must be 0 (perpetual) or positive".into(),
        ));
    }
    if input.duration_seconds > MAX_DURATION_SECONDS {
        return Err(AppError::Validation(format!(
            "duration_seconds must be at most {} (100 years)",
            MAX_DURATION_SECONDS
        )));
    }
    if input.max_seats <= 0 {
        return Err(AppError::Validation("max_seats must be at least 1".into()));
    }

    Ok(NewLicense {
        license_id: license_id.to_string(),
        key_digest: hash_key(&input.raw_key),
        duration_seconds: input.duration_seconds,
        max_seats: input.max_seats,
    })
}
