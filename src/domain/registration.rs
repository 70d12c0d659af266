// ==========================================
// Motor de Asignación - Registration Entity
// ==========================================
// Owned by the registration subsystem; this engine reads it and appends
// assignment rows referencing it, never mutates or deletes it.
// ==========================================

use crate::domain::types::{GradeBucket, Phase};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A competitor's enrollment in one area/level for one phase (inscripción de área)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub registration_id: String,
    pub competitor_name: String,
    pub area_id: String,
    pub institution_id: String,
    pub phase: Phase,
    /// Grade bucket recorded at registration time (level + grade)
    pub bucket: GradeBucket,
    /// Evaluator ids already assigned in this phase (joined at load time)
    pub assigned_evaluators: HashSet<String>,
}

impl Registration {
    /// Number of distinct evaluators already assigned for the phase
    pub fn assigned_count(&self) -> usize {
        self.assigned_evaluators.len()
    }

    /// True once the registration carries its full target of evaluators
    pub fn is_fully_assigned(&self, num_evaluadores: usize) -> bool {
        self.assigned_count() >= num_evaluadores
    }
}
