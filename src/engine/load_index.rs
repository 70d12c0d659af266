// ==========================================
// Motor de Asignación - Load Index
// ==========================================
// Per-run view of who already has what: registration -> assigned evaluator
// set, evaluator -> committed count, both scoped to one phase. Built fresh
// from the catalog snapshot at the start of every run and never cached
// across calls.
// ==========================================

use crate::domain::evaluator::Evaluator;
use crate::domain::registration::Registration;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct LoadIndex {
    registration_assigned: HashMap<String, HashSet<String>>,
    evaluator_load: HashMap<String, usize>,
}

impl LoadIndex {
    /// Derive the index from the freshly loaded catalog entities
    pub fn from_catalog(registrations: &[Registration], evaluators: &[Evaluator]) -> Self {
        let registration_assigned = registrations
            .iter()
            .map(|r| (r.registration_id.clone(), r.assigned_evaluators.clone()))
            .collect();
        let evaluator_load = evaluators
            .iter()
            .map(|e| (e.evaluator_id.clone(), e.assigned_count))
            .collect();
        Self {
            registration_assigned,
            evaluator_load,
        }
    }

    /// Evaluator ids already committed for this registration in the phase
    pub fn assigned_evaluators(&self, registration_id: &str) -> Option<&HashSet<String>> {
        self.registration_assigned.get(registration_id)
    }

    pub fn registration_assigned_count(&self, registration_id: &str) -> usize {
        self.registration_assigned
            .get(registration_id)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    pub fn evaluator_assigned_count(&self, evaluator_id: &str) -> usize {
        self.evaluator_load.get(evaluator_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EducationalLevel, GradeBucket, Phase};

    fn reg(id: &str, assigned: &[&str]) -> Registration {
        Registration {
            registration_id: id.to_string(),
            competitor_name: "X".to_string(),
            area_id: "MAT".to_string(),
            institution_id: "U1".to_string(),
            phase: Phase::Final,
            bucket: GradeBucket::new(EducationalLevel::Primaria, 3),
            assigned_evaluators: assigned.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_counts_come_from_snapshot() {
        let registrations = vec![reg("i1", &["e1", "e2"]), reg("i2", &[])];
        let evaluators = vec![Evaluator {
            evaluator_id: "e1".to_string(),
            name: "L".to_string(),
            email: "l@x".to_string(),
            institution_id: "U2".to_string(),
            qualified_areas: Default::default(),
            assigned_count: 7,
        }];

        let index = LoadIndex::from_catalog(&registrations, &evaluators);
        assert_eq!(index.registration_assigned_count("i1"), 2);
        assert_eq!(index.registration_assigned_count("i2"), 0);
        assert_eq!(index.registration_assigned_count("desconocida"), 0);
        assert_eq!(index.evaluator_assigned_count("e1"), 7);
        assert_eq!(index.evaluator_assigned_count("e9"), 0);
        assert!(index.assigned_evaluators("i1").unwrap().contains("e2"));
    }
}
