//! Storage interface consumed by the registry and the activation engine.
//!
//! The engine never talks to a database directly. Everything it reads or
//! writes for one activation call happens through a [`LicenseUnit`] handed to
//! it by [`LicenseStore::with_license`], and the store guarantees that unit of
//! work is exclusive per license and all-or-nothing. Lookups that never write
//! go through [`LicenseStore::read_license`] and skip the write lock.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{Activation, License, NewLicense};

pub trait LicenseStore: Send + Sync {
    /// Persist a new license. Fails with `DuplicateLicense` if the ID is taken.
    fn insert_license(&self, input: &NewLicense, created_at: i64) -> Result<License>;

    fn license_exists(&self, license_id: &str) -> Result<bool>;

    /// Run `work` as one atomic unit against the license named `license_id`.
    ///
    /// Concurrent units for the same license never interleave. Units for
    /// different licenses do not wait on each other beyond what the backing
    /// store imposes. If `work` returns an error, none of its writes persist.
    fn with_license<T, F>(&self, license_id: &str, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LicenseUnit) -> Result<T>;

    /// Run `work` against a consistent snapshot of the license without taking
    /// the write lock. Anything `work` writes is discarded.
    fn read_license<T, F>(&self, license_id: &str, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LicenseUnit) -> Result<T>;
}

/// Reads and writes available inside a single license's unit of work.
pub trait LicenseUnit {
    /// Load the license this unit was opened for, if it exists.
    fn load(&mut self) -> Result<Option<License>>;

    /// Persist first-activation bookkeeping (`first_activation_at`, `expires_at`).
    /// Refuses to overwrite values that are already set.
    fn save(&mut self, license: &License) -> Result<()>;

    fn find_activation(
        &mut self,
        license_row_id: &str,
        machine_fingerprint: &str,
    ) -> Result<Option<Activation>>;

    fn count_activations(&mut self, license_row_id: &str) -> Result<i64>;

    /// Insert a seat. The store rejects a second row for the same machine.
    fn insert_activation(
        &mut self,
        license_row_id: &str,
        machine_fingerprint: &str,
        activated_at: i64,
    ) -> Result<Activation>;
}
