// ==========================================
// Motor de Asignación - Cohort
// ==========================================
// Ephemeral grouping, never persisted: registrations sharing area, level,
// phase and grade bucket, with the evaluator headcount the cohort needs.
// ==========================================

use crate::domain::registration::Registration;
use crate::domain::types::GradeBucket;

#[derive(Debug, Clone)]
pub struct Cohort {
    pub bucket: GradeBucket,
    pub registrations: Vec<Registration>,
    /// max(num_evaluadores, ceil(n / cuota_por_evaluador))
    pub required_evaluators: usize,
}

impl Cohort {
    pub fn size(&self) -> usize {
        self.registrations.len()
    }
}
