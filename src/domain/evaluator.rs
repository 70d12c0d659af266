// ==========================================
// Motor de Asignación - Evaluator Entity
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A person qualified to grade within one or more areas (evaluador)
///
/// `assigned_count` is the evaluator's committed load for the phase being
/// planned, joined at load time from persisted assignments. It is never
/// cached across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluator {
    pub evaluator_id: String,
    pub name: String,
    pub email: String,
    pub institution_id: String,
    pub qualified_areas: HashSet<String>,
    pub assigned_count: usize,
}

impl Evaluator {
    pub fn is_qualified_for(&self, area_id: &str) -> bool {
        self.qualified_areas.contains(area_id)
    }

    /// True once the evaluator's committed load reached the per-run cap
    pub fn at_capacity(&self, cuota_por_evaluador: usize) -> bool {
        self.assigned_count >= cuota_por_evaluador
    }
}
