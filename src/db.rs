// ==========================================
// Motor de Asignación - SQLite connection init
// ==========================================
// Goals:
// - unify PRAGMA behavior across every Connection::open call (foreign keys
//   must be enabled per connection)
// - unify busy_timeout to cut down on sporadic busy errors under
//   concurrent commits
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the unified PRAGMAs to a connection
///
/// foreign_keys and busy_timeout are per-connection settings, so every
/// connection must pass through here.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the engine's tables if they do not exist.
///
/// The catalog tables (inscripcion_area, evaluador, evaluador_area) are owned
/// by the registration subsystem in production; they are created here as well
/// so a fresh database (and every test) is immediately usable.
///
/// The UNIQUE index on (inscripcion_id, evaluador_id, fase) is the hard guard
/// against duplicate pairings, including double-commit races across processes.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS inscripcion_area (
            inscripcion_id   TEXT PRIMARY KEY,
            competidor       TEXT NOT NULL,
            area_id          TEXT NOT NULL,
            nivel            TEXT NOT NULL,
            grado            INTEGER NOT NULL,
            institucion_id   TEXT NOT NULL,
            fase             TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS evaluador (
            evaluador_id     TEXT PRIMARY KEY,
            nombre           TEXT NOT NULL,
            email            TEXT NOT NULL,
            institucion_id   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS evaluador_area (
            evaluador_id     TEXT NOT NULL REFERENCES evaluador(evaluador_id),
            area_id          TEXT NOT NULL,
            PRIMARY KEY (evaluador_id, area_id)
        );

        CREATE TABLE IF NOT EXISTS asignacion_evaluador (
            asignacion_id    TEXT PRIMARY KEY,
            inscripcion_id   TEXT NOT NULL REFERENCES inscripcion_area(inscripcion_id),
            evaluador_id     TEXT NOT NULL REFERENCES evaluador(evaluador_id),
            fase             TEXT NOT NULL,
            estado           TEXT NOT NULL DEFAULT 'COMPLIANT',
            motivo_relajacion TEXT,
            created_at       TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_asignacion_unica
            ON asignacion_evaluador (inscripcion_id, evaluador_id, fase);

        CREATE INDEX IF NOT EXISTS idx_asignacion_evaluador_fase
            ON asignacion_evaluador (evaluador_id, fase);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id         TEXT NOT NULL,
            key              TEXT NOT NULL,
            value            TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}
