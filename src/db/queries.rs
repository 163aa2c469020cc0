use rusqlite::{Connection, params};

use crate::error::{AppError, Result};
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{
    ACTIVATION_COLS, ACTIVATION_WITH_LICENSE_COLS, LICENSE_COLS, LICENSE_SUMMARY_COLS, query_all,
    query_one,
};

// ============ Licenses ============

/// Insert a new license. A taken `license_id` is reported as `DuplicateLicense`.
pub fn create_license(conn: &Connection, input: &NewLicense, created_at: i64) -> Result<License> {
    let id = EntityType::License.gen_id();

    let inserted = conn.execute(
        "INSERT INTO licenses (id, license_id, key_digest, duration_seconds, max_seats, first_activation_at, expires_at, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL, 1, ?6)",
        params![
            &id,
            &input.license_id,
            &input.key_digest,
            input.duration_seconds,
            input.max_seats,
            created_at
        ],
    );

    match inserted.map_err(AppError::from) {
        Ok(_) => {}
        Err(e) if e.is_unique_violation() => {
            return Err(AppError::DuplicateLicense(input.license_id.clone()));
        }
        Err(e) => return Err(e),
    }

    Ok(License {
        id,
        license_id: input.license_id.clone(),
        key_digest: input.key_digest.clone(),
        duration_seconds: input.duration_seconds,
        max_seats: input.max_seats,
        first_activation_at: None,
        expires_at: None,
        active: true,
        created_at,
    })
}

pub fn get_license_by_license_id(conn: &Connection, license_id: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE license_id = ?1", LICENSE_COLS),
        &[&license_id],
    )
}

pub fn license_exists(conn: &Connection, license_id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM licenses WHERE license_id = ?1)",
        params![license_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

/// All license IDs in ascending order.
pub fn list_license_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT license_id FROM licenses ORDER BY license_id ASC")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

pub fn count_licenses(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))
        .map_err(Into::into)
}

/// License summaries ordered by `license_id`, with seat counts derived from activations.
pub fn list_license_summaries_paginated(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<(Vec<LicenseSummary>, i64)> {
    let total = count_licenses(conn)?;
    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM licenses l ORDER BY l.license_id ASC LIMIT ?1 OFFSET ?2",
            LICENSE_SUMMARY_COLS
        ),
        &[&limit, &offset],
    )?;
    Ok((items, total))
}

/// Write the first-activation bookkeeping for a license.
///
/// Guarded by `first_activation_at IS NULL`, so a second write is refused
/// instead of moving the expiry window.
pub fn set_first_activation(
    conn: &Connection,
    license_row_id: &str,
    first_activation_at: i64,
    expires_at: Option<i64>,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE licenses SET first_activation_at = ?1, expires_at = ?2
         WHERE id = ?3 AND first_activation_at IS NULL",
        params![first_activation_at, expires_at, license_row_id],
    )?;

    if updated == 0 {
        return Err(AppError::Internal(format!(
            "First activation already recorded for license row {}",
            license_row_id
        )));
    }
    Ok(())
}

// ============ Activations ============

pub fn get_activation(
    conn: &Connection,
    license_row_id: &str,
    machine_fingerprint: &str,
) -> Result<Option<Activation>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE license_row_id = ?1 AND machine_fingerprint = ?2",
            ACTIVATION_COLS
        ),
        &[&license_row_id, &machine_fingerprint],
    )
}

pub fn count_activations_for_license(conn: &Connection, license_row_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM activations WHERE license_row_id = ?1",
        params![license_row_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

pub fn insert_activation(
    conn: &Connection,
    license_row_id: &str,
    machine_fingerprint: &str,
    activated_at: i64,
) -> Result<Activation> {
    let id = EntityType::Activation.gen_id();

    conn.execute(
        "INSERT INTO activations (id, license_row_id, machine_fingerprint, activated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![&id, license_row_id, machine_fingerprint, activated_at],
    )?;

    Ok(Activation {
        id,
        license_row_id: license_row_id.to_string(),
        machine_fingerprint: machine_fingerprint.to_string(),
        activated_at,
    })
}

/// Activations joined with their license ID, oldest first.
/// When `license_id` is given, only that license's activations are returned.
pub fn list_activations_paginated(
    conn: &Connection,
    license_id: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ActivationWithLicense>, i64)> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activations a JOIN licenses l ON l.id = a.license_row_id
         WHERE ?1 IS NULL OR l.license_id = ?1",
        params![license_id],
        |row| row.get(0),
    )?;

    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM activations a JOIN licenses l ON l.id = a.license_row_id
             WHERE ?1 IS NULL OR l.license_id = ?1
             ORDER BY a.activated_at ASC, l.license_id ASC, a.id ASC
             LIMIT ?2 OFFSET ?3",
            ACTIVATION_WITH_LICENSE_COLS
        ),
        &[&license_id, &limit, &offset],
    )?;

    Ok((items, total))
}
