//! Database schema and migrations.

use rusqlite::Connection;

use crate::error::Result;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema. Idempotent, safe to call every boot.
pub fn initialize(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        // Fresh database - create all tables
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version < SCHEMA_VERSION {
        // Run migrations
        migrate(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    // Check if the schema_version table exists
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
        [version],
    )?;
    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- Append-only sensor readings. Date and time are text under the
        -- configured formats; text comparison orders correctly for the
        -- default big-endian formats.
        CREATE TABLE IF NOT EXISTS sensor_data (
            temperature NUMERIC NOT NULL,
            humidity NUMERIC NOT NULL,
            timestamp_date TEXT NOT NULL,
            timestamp_time TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sensor_data_date
            ON sensor_data(timestamp_date);

        -- Poller failure log. No uniqueness on timestamp.
        CREATE TABLE IF NOT EXISTS logs (
            message TEXT NOT NULL,
            timestamp TEXT NOT NULL
        );

        -- Singleton runtime configuration row.
        CREATE TABLE IF NOT EXISTS config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            sensor_interval INTEGER NOT NULL,
            dateformat TEXT NOT NULL,
            timeformat TEXT NOT NULL,
            weekformat TEXT NOT NULL,
            monthformat TEXT NOT NULL,
            iso_week_format TEXT NOT NULL,
            use_sensor INTEGER NOT NULL CHECK (use_sensor IN (0, 1))
        );
        "#,
    )?;

    Ok(())
}

/// Run migrations from old_version to current.
fn migrate(conn: &Connection, old_version: i32) -> Result<()> {
    // Add future migrations here
    // if old_version < 2 { migrate_to_v2(conn)?; }

    let _ = old_version;
    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}
