// ==========================================
// Shared fixtures for repository and engine tests
// ==========================================

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

#[allow(clippy::too_many_arguments)]
pub fn insert_registration(
    conn: &Arc<Mutex<Connection>>,
    id: &str,
    name: &str,
    area: &str,
    nivel: &str,
    grado: u8,
    institucion: &str,
    fase: &str,
) {
    conn.lock()
        .unwrap()
        .execute(
            "INSERT INTO inscripcion_area VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, name, area, nivel, grado, institucion, fase],
        )
        .unwrap();
}

pub fn insert_evaluator(
    conn: &Arc<Mutex<Connection>>,
    id: &str,
    name: &str,
    institucion: &str,
    areas: &[&str],
) {
    let guard = conn.lock().unwrap();
    guard
        .execute(
            "INSERT INTO evaluador VALUES (?1, ?2, ?3, ?4)",
            params![id, name, format!("{}@olimpo.test", id), institucion],
        )
        .unwrap();
    for area in areas {
        guard
            .execute(
                "INSERT INTO evaluador_area VALUES (?1, ?2)",
                params![id, area],
            )
            .unwrap();
    }
}
