use rusqlite::Connection;

/// Initialize the database schema. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Licenses: only the key digest is stored, never the raw key.
        -- first_activation_at / expires_at are written once, on the first seat.
        CREATE TABLE IF NOT EXISTS licenses (
            id TEXT PRIMARY KEY,
            license_id TEXT NOT NULL UNIQUE,
            key_digest TEXT NOT NULL,
            duration_seconds INTEGER NOT NULL CHECK (duration_seconds >= 0),
            max_seats INTEGER NOT NULL CHECK (max_seats > 0),
            first_activation_at INTEGER,
            expires_at INTEGER,
            active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        );

        -- Activations: one row per seat. The composite unique key is the
        -- storage-level guarantee against a machine holding two seats.
        CREATE TABLE IF NOT EXISTS activations (
            id TEXT PRIMARY KEY,
            license_row_id TEXT NOT NULL REFERENCES licenses(id) ON DELETE CASCADE,
            machine_fingerprint TEXT NOT NULL,
            activated_at INTEGER NOT NULL,

            UNIQUE(license_row_id, machine_fingerprint)
        );
        CREATE INDEX IF NOT EXISTS idx_activations_license ON activations(license_row_id);
        CREATE INDEX IF NOT EXISTS idx_activations_activated_at ON activations(activated_at);
        "#,
    )
}
