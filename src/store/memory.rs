use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{AppError, Result};
use crate::id::EntityType;
use crate::models::{Activation, License, NewLicense};

use super::{LicenseStore, LicenseUnit};

#[derive(Debug, Clone)]
struct LicenseSlot {
    license: License,
    activations: Vec<Activation>,
}

/// In-process store with one mutex per license.
///
/// A unit of work locks only its own license, works on a staged copy, and
/// publishes the copy only if the work succeeds. Units for different licenses
/// run fully in parallel.
#[derive(Debug, Default)]
pub struct MemoryStore {
    licenses: RwLock<HashMap<String, Arc<Mutex<LicenseSlot>>>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("Memory store lock poisoned".into())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, license_id: &str) -> Result<Option<Arc<Mutex<LicenseSlot>>>> {
        let licenses = self.licenses.read().map_err(poisoned)?;
        Ok(licenses.get(license_id).cloned())
    }

    /// Current committed state of a license.
    pub fn license(&self, license_id: &str) -> Result<Option<License>> {
        let Some(slot) = self.slot(license_id)? else {
            return Ok(None);
        };
        let committed = slot.lock().map_err(poisoned)?;
        Ok(Some(committed.license.clone()))
    }

    /// Committed activations of a license, in insertion order.
    pub fn activations(&self, license_id: &str) -> Result<Vec<Activation>> {
        let Some(slot) = self.slot(license_id)? else {
            return Ok(Vec::new());
        };
        let committed = slot.lock().map_err(poisoned)?;
        Ok(committed.activations.clone())
    }
}

impl LicenseStore for MemoryStore {
    fn insert_license(&self, input: &NewLicense, created_at: i64) -> Result<License> {
        let mut licenses = self.licenses.write().map_err(poisoned)?;
        if licenses.contains_key(&input.license_id) {
            return Err(AppError::DuplicateLicense(input.license_id.clone()));
        }

        let license = License {
            id: EntityType::License.gen_id(),
            license_id: input.license_id.clone(),
            key_digest: input.key_digest.clone(),
            duration_seconds: input.duration_seconds,
            max_seats: input.max_seats,
            first_activation_at: None,
            expires_at: None,
            active: true,
            created_at,
        };

        licenses.insert(
            input.license_id.clone(),
            Arc::new(Mutex::new(LicenseSlot {
                license: license.clone(),
                activations: Vec::new(),
            })),
        );
        Ok(license)
    }

    fn license_exists(&self, license_id: &str) -> Result<bool> {
        Ok(self.slot(license_id)?.is_some())
    }

    fn with_license<T, F>(&self, license_id: &str, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LicenseUnit) -> Result<T>,
    {
        let Some(slot) = self.slot(license_id)? else {
            return work(&mut MemoryUnit { staged: None });
        };

        let mut committed = slot.lock().map_err(poisoned)?;
        let mut unit = MemoryUnit {
            staged: Some(committed.clone()),
        };
        let out = work(&mut unit)?;

        if let Some(staged) = unit.staged {
            *committed = staged;
        }
        Ok(out)
    }

    fn read_license<T, F>(&self, license_id: &str, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LicenseUnit) -> Result<T>,
    {
        let Some(slot) = self.slot(license_id)? else {
            return work(&mut MemoryUnit { staged: None });
        };

        let snapshot = slot.lock().map_err(poisoned)?.clone();
        work(&mut MemoryUnit {
            staged: Some(snapshot),
        })
    }
}

struct MemoryUnit {
    staged: Option<LicenseSlot>,
}

impl MemoryUnit {
    fn staged_for(&mut self, license_row_id: &str) -> Result<&mut LicenseSlot> {
        match self.staged.as_mut() {
            Some(slot) if slot.license.id == license_row_id => Ok(slot),
            _ => Err(AppError::Internal(format!(
                "License row {} is not part of this unit of work",
                license_row_id
            ))),
        }
    }
}

impl LicenseUnit for MemoryUnit {
    fn load(&mut self) -> Result<Option<License>> {
        Ok(self.staged.as_ref().map(|slot| slot.license.clone()))
    }

    fn save(&mut self, license: &License) -> Result<()> {
        let slot = self.staged_for(&license.id)?;
        if slot.license.first_activation_at.is_some() {
            return Err(AppError::Internal(format!(
                "First activation already recorded for license row {}",
                license.id
            )));
        }
        slot.license.first_activation_at = license.first_activation_at;
        slot.license.expires_at = license.expires_at;
        Ok(())
    }

    fn find_activation(
        &mut self,
        license_row_id: &str,
        machine_fingerprint: &str,
    ) -> Result<Option<Activation>> {
        let slot = self.staged_for(license_row_id)?;
        Ok(slot
            .activations
            .iter()
            .find(|a| a.machine_fingerprint == machine_fingerprint)
            .cloned())
    }

    fn count_activations(&mut self, license_row_id: &str) -> Result<i64> {
        let slot = self.staged_for(license_row_id)?;
        Ok(slot.activations.len() as i64)
    }

    fn insert_activation(
        &mut self,
        license_row_id: &str,
        machine_fingerprint: &str,
        activated_at: i64,
    ) -> Result<Activation> {
        let slot = self.staged_for(license_row_id)?;
        if slot
            .activations
            .iter()
            .any(|a| a.machine_fingerprint == machine_fingerprint)
        {
            return Err(AppError::Internal(
                "UNIQUE constraint failed: activations.license_row_id, activations.machine_fingerprint"
                    .into(),
            ));
        }

        let activation = Activation {
            id: EntityType::Activation.gen_id(),
            license_row_id: license_row_id.to_string(),
            machine_fingerprint: machine_fingerprint.to_string(),
            activated_at,
        };
        slot.activations.push(activation.clone());
        Ok(activation)
    }
}
