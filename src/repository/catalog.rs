// ==========================================
// Motor de Asignación - Catalog Gateway
// ==========================================
// Narrow contract over the external catalogs: areas, levels and the
// eligible registration/evaluator sets for a scope. The engine depends on
// this trait, not on the concrete store, so tests and other backends can
// substitute their own.
// ==========================================

use crate::domain::evaluator::Evaluator;
use crate::domain::registration::Registration;
use crate::domain::types::{EducationalLevel, Phase};
use crate::repository::assignment_repo::AssignmentRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::evaluator_repo::EvaluatorRepository;
use crate::repository::registration_repo::RegistrationRepository;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub trait CatalogGateway {
    /// Eligible registrations for (area, level, phase), annotated with
    /// institution, grade and already-assigned evaluator sets.
    fn eligible_registrations(
        &self,
        area_id: &str,
        level: EducationalLevel,
        phase: Phase,
    ) -> RepositoryResult<Vec<Registration>>;

    /// Evaluators qualified for the area, annotated with institution and
    /// committed load for the phase.
    fn eligible_evaluators(&self, area_id: &str, phase: Phase)
        -> RepositoryResult<Vec<Evaluator>>;
}

/// SQLite-backed gateway composed of the read repositories; assignment
/// history stays behind the assignment repository, so the registration
/// query never duplicates its SQL
pub struct SqliteCatalogGateway {
    registrations: RegistrationRepository,
    evaluators: EvaluatorRepository,
    assignments: AssignmentRepository,
}

impl SqliteCatalogGateway {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            registrations: RegistrationRepository::new(conn.clone()),
            evaluators: EvaluatorRepository::new(conn.clone()),
            assignments: AssignmentRepository::new(conn),
        }
    }
}

impl CatalogGateway for SqliteCatalogGateway {
    fn eligible_registrations(
        &self,
        area_id: &str,
        level: EducationalLevel,
        phase: Phase,
    ) -> RepositoryResult<Vec<Registration>> {
        let mut registrations = self.registrations.find_eligible(area_id, level, phase)?;

        let ids: Vec<String> = registrations
            .iter()
            .map(|r| r.registration_id.clone())
            .collect();
        let mut assigned: HashMap<String, HashSet<String>> = HashMap::new();
        for assignment in self.assignments.find_for_registrations(&ids, phase)? {
            assigned
                .entry(assignment.registration_id)
                .or_default()
                .insert(assignment.evaluator_id);
        }
        for registration in &mut registrations {
            if let Some(set) = assigned.remove(&registration.registration_id) {
                registration.assigned_evaluators = set;
            }
        }

        Ok(registrations)
    }

    fn eligible_evaluators(
        &self,
        area_id: &str,
        phase: Phase,
    ) -> RepositoryResult<Vec<Evaluator>> {
        self.evaluators.find_qualified(area_id, phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{insert_evaluator, insert_registration, setup_test_db};

    #[test]
    fn test_assigned_sets_are_joined_per_phase() {
        let conn = setup_test_db();
        insert_registration(&conn, "i1", "Ana", "MAT", "PRIMARIA", 3, "U1", "FINAL");
        insert_evaluator(&conn, "e1", "Luis", "U2", &["MAT"]);
        insert_evaluator(&conn, "e2", "Mora", "U3", &["MAT"]);

        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO asignacion_evaluador VALUES ('a1','i1','e1','FINAL','COMPLIANT',NULL,'2026-01-01T00:00:00')",
                [],
            )
            .unwrap();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO asignacion_evaluador VALUES ('a2','i1','e2','CLASIFICACION','COMPLIANT',NULL,'2026-01-01T00:00:00')",
                [],
            )
            .unwrap();

        let gateway = SqliteCatalogGateway::new(conn);
        let regs = gateway
            .eligible_registrations("MAT", EducationalLevel::Primaria, Phase::Final)
            .unwrap();

        assert_eq!(regs.len(), 1);
        assert!(regs[0].assigned_evaluators.contains("e1"));
        // the CLASIFICACION assignment must not leak into the FINAL view
        assert!(!regs[0].assigned_evaluators.contains("e2"));
    }
}
