// ==========================================
// Motor de Asignación - Evaluator Repository
// ==========================================
// Read-only view over evaluador / evaluador_area; each evaluator is loaded
// with its committed assignment count for the requested phase.
// ==========================================

use crate::domain::evaluator::Evaluator;
use crate::domain::types::Phase;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub struct EvaluatorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EvaluatorRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Evaluators qualified for the area, with their committed load for the
    /// phase. Ordered by id so allocation runs are reproducible.
    pub fn find_qualified(&self, area_id: &str, phase: Phase) -> RepositoryResult<Vec<Evaluator>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT e.evaluador_id, e.nombre, e.email, e.institucion_id,
                      (SELECT COUNT(*) FROM asignacion_evaluador a
                        WHERE a.evaluador_id = e.evaluador_id AND a.fase = ?2)
               FROM evaluador e
               JOIN evaluador_area ea ON ea.evaluador_id = e.evaluador_id
               WHERE ea.area_id = ?1
               ORDER BY e.evaluador_id"#,
        )?;

        let mut evaluators = stmt
            .query_map(params![area_id, phase.as_str()], |row| {
                Ok(Evaluator {
                    evaluator_id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    institution_id: row.get(3)?,
                    qualified_areas: HashSet::new(),
                    assigned_count: row.get::<_, i64>(4)? as usize,
                })
            })?
            .collect::<Result<Vec<Evaluator>, _>>()?;

        let mut area_stmt = conn.prepare(
            "SELECT area_id FROM evaluador_area WHERE evaluador_id = ?1",
        )?;
        for evaluator in &mut evaluators {
            let areas = area_stmt
                .query_map(params![evaluator.evaluator_id], |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<Result<HashSet<String>, _>>()?;
            evaluator.qualified_areas = areas;
        }

        Ok(evaluators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{insert_evaluator, insert_registration, setup_test_db};

    #[test]
    fn test_find_qualified_filters_area() {
        let conn = setup_test_db();
        insert_evaluator(&conn, "e1", "Luis", "U1", &["MAT", "FIS"]);
        insert_evaluator(&conn, "e2", "Mora", "U2", &["FIS"]);

        let repo = EvaluatorRepository::new(conn);
        let evals = repo.find_qualified("MAT", Phase::Final).unwrap();

        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0].evaluator_id, "e1");
        assert!(evals[0].qualified_areas.contains("FIS"));
        assert_eq!(evals[0].assigned_count, 0);
    }

    #[test]
    fn test_load_is_phase_scoped() {
        let conn = setup_test_db();
        insert_registration(&conn, "i1", "Ana", "MAT", "PRIMARIA", 3, "U1", "FINAL");
        insert_evaluator(&conn, "e1", "Luis", "U2", &["MAT"]);

        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO asignacion_evaluador VALUES ('a1','i1','e1','CLASIFICACION','COMPLIANT',NULL,'2026-01-01T00:00:00')",
                [],
            )
            .unwrap();

        let repo = EvaluatorRepository::new(conn);
        let evals = repo.find_qualified("MAT", Phase::Final).unwrap();
        assert_eq!(evals[0].assigned_count, 0);

        let evals = repo.find_qualified("MAT", Phase::Clasificacion).unwrap();
        assert_eq!(evals[0].assigned_count, 1);
    }
}
