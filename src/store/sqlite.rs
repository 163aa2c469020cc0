use rusqlite::{Connection, TransactionBehavior};

use crate::db::{DbPool, queries};
use crate::error::{AppError, Result};
use crate::models::{Activation, License, NewLicense};

use super::{LicenseStore, LicenseUnit};

/// SQLite-backed store.
///
/// Each unit of work runs in a `BEGIN IMMEDIATE` transaction, which takes the
/// database write lock before the first read. The existing-activation lookup,
/// seat count and insert therefore cannot interleave with another writer.
///
/// SQLite has one write lock per database file, so units for different
/// licenses are serialized too. A server database with row locks would add
/// `FOR UPDATE` to the license load to get per-license scope.
///
/// Read-only lookups use a deferred transaction. In rollback-journal mode a
/// reader only waits for a writer that is committing, not for one that merely
/// holds the reserved lock from `BEGIN IMMEDIATE`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl LicenseStore for SqliteStore {
    fn insert_license(&self, input: &NewLicense, created_at: i64) -> Result<License> {
        let conn = self.pool.get()?;
        queries::create_license(&conn, input, created_at)
    }

    fn license_exists(&self, license_id: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        queries::license_exists(&conn, license_id)
    }

    fn with_license<T, F>(&self, license_id: &str, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LicenseUnit) -> Result<T>,
    {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dropping `tx` on the error path rolls back every write made by `work`.
        let out = {
            let mut unit = SqliteUnit {
                conn: &tx,
                license_id,
            };
            work(&mut unit)?
        };

        tx.commit()?;
        Ok(out)
    }

    fn read_license<T, F>(&self, license_id: &str, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LicenseUnit) -> Result<T>,
    {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

        let mut unit = SqliteUnit {
            conn: &tx,
            license_id,
        };
        let out = work(&mut unit)?;
        tx.rollback()?;
        Ok(out)
    }
}

struct SqliteUnit<'a> {
    conn: &'a Connection,
    license_id: &'a str,
}

impl LicenseUnit for SqliteUnit<'_> {
    fn load(&mut self) -> Result<Option<License>> {
        queries::get_license_by_license_id(self.conn, self.license_id)
    }

    fn save(&mut self, license: &License) -> Result<()> {
        let first_activation_at = license.first_activation_at.ok_or_else(|| {
            AppError::Internal("Refusing to save license without first_activation_at".into())
        })?;
        queries::set_first_activation(
            self.conn,
            &license.id,
            first_activation_at,
            license.expires_at,
        )
    }

    fn find_activation(
        &mut self,
        license_row_id: &str,
        machine_fingerprint: &str,
    ) -> Result<Option<Activation>> {
        queries::get_activation(self.conn, license_row_id, machine_fingerprint)
    }

    fn count_activations(&mut self, license_row_id: &str) -> Result<i64> {
        queries::count_activations_for_license(self.conn, license_row_id)
    }

    fn insert_activation(
        &mut self,
        license_row_id: &str,
        machine_fingerprint: &str,
        activated_at: i64,
    ) -> Result<Activation> {
        queries::insert_activation(self.conn, license_row_id, machine_fingerprint, activated_at)
    }
}
