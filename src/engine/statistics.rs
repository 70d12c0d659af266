// ==========================================
// Motor de Asignación - Statistics Aggregator
// ==========================================
// Summarizes a run for direct display: totals plus a per-cohort breakdown
// with per-evaluator loads. No further computation is expected from the
// caller; the exclusion counters travel separately on the run result.
// ==========================================

use crate::config::RunConfig;
use crate::domain::evaluator::Evaluator;
use crate::engine::allocator::AllocationOutcome;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-evaluator load row inside a cohort breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorLoad {
    pub evaluador_id: String,
    pub nombre: String,
    pub asignadas: usize,
}

/// Display-ready summary of one cohort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortBreakdown {
    pub grado: String,
    pub inscripciones: usize,
    pub evaluadores: usize,
    pub cargas: Vec<EvaluatorLoad>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub total_inscripciones: usize,
    pub total_evaluadores_utilizados: usize,
    pub cuota_por_evaluador: usize,
    /// Cohort count
    pub grados_asignados: usize,
    pub distribucion_grados: Vec<CohortBreakdown>,
    /// Placements that had to relax a constraint
    pub observaciones: usize,
}

pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Build run statistics from the allocation outcome.
    ///
    /// `evaluators` supplies display names; an id missing from it (cannot
    /// happen through the orchestrator) falls back to the id itself.
    pub fn summarize(
        &self,
        outcome: &AllocationOutcome,
        evaluators: &[Evaluator],
        config: &RunConfig,
    ) -> RunStatistics {
        let names: HashMap<&str, &str> = evaluators
            .iter()
            .map(|e| (e.evaluator_id.as_str(), e.name.as_str()))
            .collect();

        let used: HashSet<&str> = outcome
            .pairs
            .iter()
            .map(|p| p.evaluator_id.as_str())
            .collect();

        let distribucion: Vec<CohortBreakdown> = outcome
            .cohorts
            .iter()
            .map(|cohort| CohortBreakdown {
                grado: cohort.bucket.label(),
                inscripciones: cohort.registrations,
                evaluadores: cohort.roster.len(),
                cargas: cohort
                    .roster
                    .iter()
                    .map(|entry| EvaluatorLoad {
                        evaluador_id: entry.evaluator_id.clone(),
                        nombre: names
                            .get(entry.evaluator_id.as_str())
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| entry.evaluator_id.clone()),
                        asignadas: entry.assigned,
                    })
                    .collect(),
            })
            .collect();

        RunStatistics {
            total_inscripciones: outcome.cohorts.iter().map(|c| c.registrations).sum(),
            total_evaluadores_utilizados: used.len(),
            cuota_por_evaluador: config.cuota_por_evaluador,
            grados_asignados: outcome.cohorts.len(),
            distribucion_grados: distribucion,
            observaciones: outcome.relaxed_count(),
        }
    }
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::AssignmentStatus;
    use crate::domain::types::{EducationalLevel, GradeBucket};
    use crate::engine::allocator::{CandidatePair, CohortAllocation, RosterEntry};

    fn eval(id: &str, name: &str) -> Evaluator {
        Evaluator {
            evaluator_id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@olimpo.test", id),
            institution_id: "U1".to_string(),
            qualified_areas: Default::default(),
            assigned_count: 0,
        }
    }

    #[test]
    fn test_summarize_totals_and_breakdown() {
        let outcome = AllocationOutcome {
            pairs: vec![
                CandidatePair {
                    registration_id: "i1".to_string(),
                    evaluator_id: "e1".to_string(),
                    status: AssignmentStatus::Compliant,
                },
                CandidatePair {
                    registration_id: "i1".to_string(),
                    evaluator_id: "e2".to_string(),
                    status: AssignmentStatus::Compliant,
                },
                CandidatePair {
                    registration_id: "i2".to_string(),
                    evaluator_id: "e1".to_string(),
                    status: AssignmentStatus::Relaxed {
                        reason: crate::domain::assignment::RelaxReason::SameInstitution,
                    },
                },
            ],
            cohorts: vec![CohortAllocation {
                bucket: GradeBucket::new(EducationalLevel::Primaria, 3),
                registrations: 2,
                required_evaluators: 2,
                roster: vec![
                    RosterEntry {
                        evaluator_id: "e1".to_string(),
                        assigned: 2,
                    },
                    RosterEntry {
                        evaluator_id: "e2".to_string(),
                        assigned: 1,
                    },
                ],
            }],
            shortfalls: vec![],
        };
        let evaluators = vec![eval("e1", "Luis"), eval("e2", "Mora")];

        let stats = StatisticsAggregator::new().summarize(
            &outcome,
            &evaluators,
            &RunConfig::default(),
        );

        assert_eq!(stats.total_inscripciones, 2);
        assert_eq!(stats.total_evaluadores_utilizados, 2);
        assert_eq!(stats.cuota_por_evaluador, 30);
        assert_eq!(stats.grados_asignados, 1);
        assert_eq!(stats.observaciones, 1);

        let breakdown = &stats.distribucion_grados[0];
        assert_eq!(breakdown.grado, "PRIMARIA 3°");
        assert_eq!(breakdown.cargas[0].nombre, "Luis");
        assert_eq!(breakdown.cargas[0].asignadas, 2);
    }

    #[test]
    fn test_empty_outcome() {
        let stats = StatisticsAggregator::new().summarize(
            &AllocationOutcome::default(),
            &[],
            &RunConfig::default(),
        );
        assert_eq!(stats.total_inscripciones, 0);
        assert_eq!(stats.grados_asignados, 0);
        assert!(stats.distribucion_grados.is_empty());
    }
}
