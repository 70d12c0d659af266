// ==========================================
// Motor de Asignación - Assignment Repository
// ==========================================
// Append-only store for asignacion_evaluador. The batch insert is the only
// write path of the whole engine and runs inside a single IMMEDIATE
// transaction: any row failure rolls the entire batch back.
// ==========================================

use crate::domain::assignment::{Assignment, AssignmentStatus};
use crate::domain::types::Phase;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};

pub struct AssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Persist a batch of assignments atomically.
    ///
    /// IMMEDIATE behavior takes the write lock up front so a competing commit
    /// on the same database blocks instead of failing midway. A UNIQUE
    /// violation on any row (double-commit race) aborts and rolls back the
    /// whole batch.
    pub fn batch_insert(&self, assignments: &[Assignment]) -> RepositoryResult<usize> {
        if assignments.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO asignacion_evaluador (
                        asignacion_id, inscripcion_id, evaluador_id, fase,
                        estado, motivo_relajacion, created_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )?;

            for assignment in assignments {
                let (estado, motivo) = assignment.status.to_columns();
                stmt.execute(params![
                    &assignment.assignment_id,
                    &assignment.registration_id,
                    &assignment.evaluator_id,
                    assignment.phase.as_str(),
                    estado,
                    motivo,
                    assignment
                        .created_at
                        .format("%Y-%m-%dT%H:%M:%S%.3f")
                        .to_string(),
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(assignments.len())
    }

    /// All persisted assignments for a phase involving the given registrations
    pub fn find_for_registrations(
        &self,
        registration_ids: &[String],
        phase: Phase,
    ) -> RepositoryResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT asignacion_id, inscripcion_id, evaluador_id, fase,
                      estado, motivo_relajacion, created_at
               FROM asignacion_evaluador
               WHERE fase = ?1 AND inscripcion_id = ?2
               ORDER BY created_at, asignacion_id"#,
        )?;

        let mut out = Vec::new();
        for registration_id in registration_ids {
            let rows = stmt.query_map(params![phase.as_str(), registration_id], map_row)?;
            for row in rows {
                out.push(row??);
            }
        }
        Ok(out)
    }

    /// Total committed rows for the phase (diagnostics and tests)
    pub fn count_for_phase(&self, phase: Phase) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM asignacion_evaluador WHERE fase = ?1",
            params![phase.as_str()],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

type RowResult = Result<RepositoryResult<Assignment>, rusqlite::Error>;

fn map_row(row: &rusqlite::Row<'_>) -> RowResult {
    let asignacion_id: String = row.get(0)?;
    let inscripcion_id: String = row.get(1)?;
    let evaluador_id: String = row.get(2)?;
    let fase: String = row.get(3)?;
    let estado: String = row.get(4)?;
    let motivo: Option<String> = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(build_assignment(
        asignacion_id,
        inscripcion_id,
        evaluador_id,
        fase,
        estado,
        motivo,
        created_at,
    ))
}

fn build_assignment(
    asignacion_id: String,
    inscripcion_id: String,
    evaluador_id: String,
    fase: String,
    estado: String,
    motivo: Option<String>,
    created_at: String,
) -> RepositoryResult<Assignment> {
    let phase = fase
        .parse::<Phase>()
        .map_err(|message| RepositoryError::FieldValueError {
            field: "fase".to_string(),
            message,
        })?;
    let status = AssignmentStatus::from_columns(&estado, motivo.as_deref()).ok_or_else(|| {
        RepositoryError::FieldValueError {
            field: "estado".to_string(),
            message: format!("estado/motivo no interpretable: {} {:?}", estado, motivo),
        }
    })?;
    let created_at = chrono::NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%dT%H:%M:%S%.3f")
        .map_err(|e| RepositoryError::FieldValueError {
            field: "created_at".to_string(),
            message: e.to_string(),
        })?;

    Ok(Assignment {
        assignment_id: asignacion_id,
        registration_id: inscripcion_id,
        evaluator_id: evaluador_id,
        phase,
        status,
        created_at,
    })
}
