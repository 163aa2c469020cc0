//! Row mapping trait and query helpers.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const LICENSE_COLS: &str = "id, license_id, key_digest, duration_seconds, max_seats, first_activation_at, expires_at, active, created_at";

pub const ACTIVATION_COLS: &str = "id, license_row_id, machine_fingerprint, activated_at";

/// Summary columns; `used_seats` is always counted from the activation rows.
pub const LICENSE_SUMMARY_COLS: &str = "l.license_id, l.duration_seconds, l.max_seats, (SELECT COUNT(*) FROM activations a WHERE a.license_row_id = l.id), l.first_activation_at, l.expires_at, l.active, l.created_at";

pub const ACTIVATION_WITH_LICENSE_COLS: &str =
    "a.id, a.license_row_id, a.machine_fingerprint, a.activated_at, l.license_id";

// ============ FromRow Implementations ============

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            license_id: row.get(1)?,
            key_digest: row.get(2)?,
            duration_seconds: row.get(3)?,
            max_seats: row.get(4)?,
            first_activation_at: row.get(5)?,
            expires_at: row.get(6)?,
            active: row.get::<_, i32>(7)? != 0,
            created_at: row.get(8)?,
        })
    }
}

impl FromRow for Activation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Activation {
            id: row.get(0)?,
            license_row_id: row.get(1)?,
            machine_fingerprint: row.get(2)?,
            activated_at: row.get(3)?,
        })
    }
}

impl FromRow for LicenseSummary {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseSummary {
            license_id: row.get(0)?,
            duration_seconds: row.get(1)?,
            max_seats: row.get(2)?,
            used_seats: row.get(3)?,
            first_activation_at: row.get(4)?,
            expires_at: row.get(5)?,
            active: row.get::<_, i32>(6)? != 0,
            created_at: row.get(7)?,
        })
    }
}

impl FromRow for ActivationWithLicense {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ActivationWithLicense {
            activation: Activation::from_row(row)?,
            license_id: row.get(4)?,
        })
    }
}
