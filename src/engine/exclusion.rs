// ==========================================
// Motor de Asignación - Exclusion Filter
// ==========================================
// Makes reruns idempotent: registrations that already carry their full
// evaluator target and evaluators already at capacity are dropped before
// allocation, and the drop counts are reported so the operator sees why a
// rerun produced less (or no) new work.
// ==========================================

use crate::config::RunConfig;
use crate::domain::cohort::Cohort;
use crate::domain::evaluator::Evaluator;
use crate::engine::group_planner::GroupPlanner;
use crate::engine::load_index::LoadIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One side of the exclusion report (registrations or evaluators)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionCounts {
    /// Everything considered before filtering
    pub total: usize,
    /// Dropped because prior runs already assigned them / filled them up
    pub con_asignacion: usize,
    /// Left available for this run
    pub disponibles: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionReport {
    pub inscripciones: ExclusionCounts,
    pub evaluadores: ExclusionCounts,
}

/// Filter output: residual cohorts and evaluator pool plus the report
#[derive(Debug)]
pub struct FilteredWork {
    pub cohorts: Vec<Cohort>,
    pub evaluators: Vec<Evaluator>,
    pub report: ExclusionReport,
}

pub struct ExclusionFilter;

impl ExclusionFilter {
    pub fn new() -> Self {
        Self
    }

    /// Drop fully-assigned registrations and at-capacity evaluators.
    ///
    /// Residual cohorts get their required_evaluators recomputed with the
    /// same formula the planner used, so the quota arithmetic stays valid
    /// for the smaller cohort. Cohorts left empty are removed.
    #[instrument(skip_all, fields(cohorts = cohorts.len(), evaluators = evaluators.len()))]
    pub fn apply(
        &self,
        cohorts: Vec<Cohort>,
        evaluators: Vec<Evaluator>,
        load_index: &LoadIndex,
        config: &RunConfig,
    ) -> FilteredWork {
        let mut report = ExclusionReport::default();

        let mut residual_cohorts = Vec::with_capacity(cohorts.len());
        for cohort in cohorts {
            let bucket = cohort.bucket;
            let before = cohort.size();
            report.inscripciones.total += before;

            let members: Vec<_> = cohort
                .registrations
                .into_iter()
                .filter(|r| {
                    load_index.registration_assigned_count(&r.registration_id)
                        < config.num_evaluadores
                })
                .collect();

            let dropped = before - members.len();
            report.inscripciones.con_asignacion += dropped;
            report.inscripciones.disponibles += members.len();

            if dropped > 0 {
                debug!(grado = %bucket, excluidas = dropped, "inscripciones ya asignadas");
            }

            if !members.is_empty() {
                let required = GroupPlanner::required_evaluators(members.len(), config);
                residual_cohorts.push(Cohort {
                    bucket,
                    registrations: members,
                    required_evaluators: required,
                });
            }
        }

        report.evaluadores.total = evaluators.len();
        let available: Vec<_> = evaluators
            .into_iter()
            .filter(|e| !e.at_capacity(config.cuota_por_evaluador))
            .collect();
        report.evaluadores.con_asignacion = report.evaluadores.total - available.len();
        report.evaluadores.disponibles = available.len();

        FilteredWork {
            cohorts: residual_cohorts,
            evaluators: available,
            report,
        }
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::new()
    }
}
