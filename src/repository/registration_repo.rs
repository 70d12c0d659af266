// ==========================================
// Motor de Asignación - Registration Repository
// ==========================================
// Read-only view over inscripcion_area, in the stable order the allocator
// iterates. Assigned evaluator sets are joined by the catalog gateway from
// the assignment repository, not here.
// ==========================================

use crate::domain::registration::Registration;
use crate::domain::types::{EducationalLevel, GradeBucket, Phase};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub struct RegistrationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RegistrationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Eligible registrations for (area, level, phase), ordered by
    /// (institution, competitor, id). Assigned evaluator sets start empty.
    pub fn find_eligible(
        &self,
        area_id: &str,
        level: EducationalLevel,
        phase: Phase,
    ) -> RepositoryResult<Vec<Registration>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT inscripcion_id, competidor, area_id, nivel, grado, institucion_id, fase
               FROM inscripcion_area
               WHERE area_id = ?1 AND nivel = ?2 AND fase = ?3
               ORDER BY institucion_id, competidor, inscripcion_id"#,
        )?;

        let rows = stmt
            .query_map(params![area_id, level.as_str(), phase.as_str()], |row| {
                Ok(RegistrationRow {
                    inscripcion_id: row.get(0)?,
                    competidor: row.get(1)?,
                    area_id: row.get(2)?,
                    nivel: row.get(3)?,
                    grado: row.get(4)?,
                    institucion_id: row.get(5)?,
                    fase: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|row| row.into_registration())
            .collect()
    }
}

struct RegistrationRow {
    inscripcion_id: String,
    competidor: String,
    area_id: String,
    nivel: String,
    grado: i64,
    institucion_id: String,
    fase: String,
}

impl RegistrationRow {
    fn into_registration(self) -> RepositoryResult<Registration> {
        let level = EducationalLevel::from_str(&self.nivel).map_err(|message| {
            RepositoryError::FieldValueError {
                field: "nivel".to_string(),
                message,
            }
        })?;
        let phase = Phase::from_str(&self.fase).map_err(|message| {
            RepositoryError::FieldValueError {
                field: "fase".to_string(),
                message,
            }
        })?;
        let grade =
            u8::try_from(self.grado).map_err(|_| RepositoryError::FieldValueError {
                field: "grado".to_string(),
                message: format!("grado fuera de rango: {}", self.grado),
            })?;

        Ok(Registration {
            registration_id: self.inscripcion_id,
            competitor_name: self.competidor,
            area_id: self.area_id,
            institution_id: self.institucion_id,
            phase,
            bucket: GradeBucket::new(level, grade),
            assigned_evaluators: HashSet::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{insert_registration, setup_test_db};

    #[test]
    fn test_find_eligible_filters_scope_and_orders() {
        let conn = setup_test_db();
        insert_registration(&conn, "i2", "Berta", "MAT", "PRIMARIA", 3, "U2", "FINAL");
        insert_registration(&conn, "i1", "Ana", "MAT", "PRIMARIA", 3, "U1", "FINAL");
        insert_registration(&conn, "i3", "Carlos", "MAT", "SECUNDARIA", 1, "U1", "FINAL");
        insert_registration(&conn, "i4", "Diana", "FIS", "PRIMARIA", 3, "U1", "FINAL");

        let repo = RegistrationRepository::new(conn);
        let regs = repo
            .find_eligible("MAT", EducationalLevel::Primaria, Phase::Final)
            .unwrap();

        assert_eq!(regs.len(), 2);
        // stable order: institution, then name
        assert_eq!(regs[0].registration_id, "i1");
        assert_eq!(regs[1].registration_id, "i2");
        assert_eq!(regs[0].bucket.grade, 3);
    }

    #[test]
    fn test_assigned_sets_start_empty() {
        let conn = setup_test_db();
        insert_registration(&conn, "i1", "Ana", "MAT", "PRIMARIA", 3, "U1", "FINAL");

        let repo = RegistrationRepository::new(conn);
        let regs = repo
            .find_eligible("MAT", EducationalLevel::Primaria, Phase::Final)
            .unwrap();
        assert!(regs[0].assigned_evaluators.is_empty());
    }
}
