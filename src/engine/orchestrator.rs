// ==========================================
// Motor de Asignación - Orchestrator
// ==========================================
// Coordinates the pipeline: catalog -> load index -> group planner ->
// exclusion filter -> allocator -> statistics. Preview and commit are two
// separate functions: plan() never writes, commit() persists a planned
// result atomically under a per-scope lock.
// ==========================================

use crate::config::RunConfig;
use crate::domain::assignment::Assignment;
use crate::domain::evaluator::Evaluator;
use crate::domain::registration::Registration;
use crate::domain::types::{EducationalLevel, Phase};
use crate::engine::allocator::{Allocator, CandidatePair, CohortAllocation, Shortfall};
use crate::engine::exclusion::{ExclusionCounts, ExclusionFilter, ExclusionReport};
use crate::engine::group_planner::GroupPlanner;
use crate::engine::load_index::LoadIndex;
use crate::engine::statistics::{RunStatistics, StatisticsAggregator};
use crate::repository::assignment_repo::AssignmentRepository;
use crate::repository::catalog::CatalogGateway;
use crate::repository::error::RepositoryResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

// ==========================================
// Scope
// ==========================================

/// Identifies one assignment run target: (area, level, phase).
/// `ronda` is carried through unchanged and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    pub area_id: String,
    pub level: EducationalLevel,
    pub phase: Phase,
    pub ronda: Option<String>,
}

impl ScopeKey {
    fn lock_key(&self) -> (String, EducationalLevel, Phase) {
        (self.area_id.clone(), self.level, self.phase)
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.area_id, self.level, self.phase)
    }
}

// ==========================================
// No-work reasons (not errors)
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoWorkReason {
    /// The catalog returned no registrations for the area/level/phase
    NoRegistrationsForLevel,
    /// Every registration already carries its full evaluator target
    AllRegistrationsAssigned,
    /// The catalog returned no qualified evaluators for the area
    NoEvaluatorsForArea,
    /// Evaluators exist but all of them are at capacity
    AllEvaluatorsAtCapacity,
    /// Every pending registration is already paired with every available
    /// evaluator; only a larger pool can produce new assignments
    EvaluatorPoolExhausted,
}

impl NoWorkReason {
    /// Operator-facing explanation, specific enough to act on
    pub fn mensaje(&self) -> &'static str {
        match self {
            NoWorkReason::NoRegistrationsForLevel => {
                "no hay inscripciones para el área, nivel y fase seleccionados"
            }
            NoWorkReason::AllRegistrationsAssigned => {
                "todas las inscripciones ya tienen sus evaluadores asignados"
            }
            NoWorkReason::NoEvaluatorsForArea => {
                "no hay evaluadores habilitados para el área seleccionada"
            }
            NoWorkReason::AllEvaluatorsAtCapacity => {
                "no hay evaluadores disponibles: todos alcanzaron su cuota"
            }
            NoWorkReason::EvaluatorPoolExhausted => {
                "las inscripciones pendientes ya están asignadas a todos los evaluadores disponibles"
            }
        }
    }
}

// ==========================================
// Run result (preview payload, commit input)
// ==========================================

#[derive(Debug)]
pub struct RunResult {
    pub scope: ScopeKey,
    pub config: RunConfig,
    /// Candidate pairs; empty when there is no eligible work
    pub pairs: Vec<CandidatePair>,
    pub cohorts: Vec<CohortAllocation>,
    pub shortfalls: Vec<Shortfall>,
    /// Residual registrations the allocator worked on, keyed by id
    pub registrations: HashMap<String, Registration>,
    /// Filtered evaluator pool, keyed by id
    pub evaluators: HashMap<String, Evaluator>,
    pub statistics: RunStatistics,
    pub excluidos: ExclusionReport,
    pub no_work: Option<NoWorkReason>,
}

impl RunResult {
    pub fn mensaje(&self) -> Option<&'static str> {
        self.no_work.map(|r| r.mensaje())
    }
}

/// Result of a confirmed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub scope: ScopeKey,
    pub inserted: usize,
}

// ==========================================
// Scope lock registry
// ==========================================
// Commits for the same (area, level, phase) must serialize; disjoint scopes
// proceed independently. The UNIQUE index on the assignment table remains
// the cross-process guard.

#[derive(Default)]
struct ScopeLocks {
    inner: Mutex<HashMap<(String, EducationalLevel, Phase), Arc<Mutex<()>>>>,
}

impl ScopeLocks {
    fn lock_for(&self, scope: &ScopeKey) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(scope.lock_key())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

// ==========================================
// AssignmentOrchestrator
// ==========================================

pub struct AssignmentOrchestrator<G: CatalogGateway> {
    gateway: G,
    assignments: AssignmentRepository,
    locks: ScopeLocks,
    planner: GroupPlanner,
    filter: ExclusionFilter,
    allocator: Allocator,
    aggregator: StatisticsAggregator,
}

impl<G: CatalogGateway> AssignmentOrchestrator<G> {
    pub fn new(gateway: G, assignments: AssignmentRepository) -> Self {
        Self {
            gateway,
            assignments,
            locks: ScopeLocks::default(),
            planner: GroupPlanner::new(),
            filter: ExclusionFilter::new(),
            allocator: Allocator::new(),
            aggregator: StatisticsAggregator::new(),
        }
    }

    /// Compute the candidate assignment set for a scope without writing.
    ///
    /// Pure with respect to the store: two consecutive calls with no
    /// intervening commit return identical results.
    #[instrument(skip(self, config), fields(scope = %scope))]
    pub fn plan(&self, scope: &ScopeKey, config: &RunConfig) -> RepositoryResult<RunResult> {
        let registrations =
            self.gateway
                .eligible_registrations(&scope.area_id, scope.level, scope.phase)?;
        // only evaluators qualified for the requested area reach the pool,
        // whatever the backing gateway returns
        let evaluators: Vec<Evaluator> = self
            .gateway
            .eligible_evaluators(&scope.area_id, scope.phase)?
            .into_iter()
            .filter(|e| e.is_qualified_for(&scope.area_id))
            .collect();

        info!(
            inscripciones = registrations.len(),
            evaluadores = evaluators.len(),
            "catálogo cargado"
        );

        if registrations.is_empty() {
            return Ok(Self::empty_result(
                scope,
                config,
                NoWorkReason::NoRegistrationsForLevel,
                ExclusionReport::default(),
                evaluators,
            ));
        }
        if evaluators.is_empty() {
            // the filter never ran; report the registration side anyway so
            // the operator sees how much work is waiting on evaluators
            let con_asignacion = registrations
                .iter()
                .filter(|r| r.is_fully_assigned(config.num_evaluadores))
                .count();
            let excluidos = ExclusionReport {
                inscripciones: ExclusionCounts {
                    total: registrations.len(),
                    con_asignacion,
                    disponibles: registrations.len() - con_asignacion,
                },
                evaluadores: ExclusionCounts::default(),
            };
            return Ok(Self::empty_result(
                scope,
                config,
                NoWorkReason::NoEvaluatorsForArea,
                excluidos,
                evaluators,
            ));
        }

        let load_index = LoadIndex::from_catalog(&registrations, &evaluators);
        let cohorts = self.planner.plan_cohorts(registrations, config);
        let filtered = self
            .filter
            .apply(cohorts, evaluators, &load_index, config);

        if filtered.cohorts.is_empty() {
            return Ok(Self::empty_result(
                scope,
                config,
                NoWorkReason::AllRegistrationsAssigned,
                filtered.report,
                filtered.evaluators,
            ));
        }
        if filtered.evaluators.is_empty() {
            return Ok(Self::empty_result(
                scope,
                config,
                NoWorkReason::AllEvaluatorsAtCapacity,
                filtered.report,
                filtered.evaluators,
            ));
        }

        let outcome =
            self.allocator
                .allocate(&filtered.cohorts, &filtered.evaluators, &load_index, config);
        let statistics = self
            .aggregator
            .summarize(&outcome, &filtered.evaluators, config);

        info!(
            pares = outcome.pairs.len(),
            observaciones = outcome.relaxed_count(),
            faltantes = outcome.shortfalls.len(),
            "plan calculado"
        );

        // residual work can still produce zero pairs when every pending
        // registration already holds the whole pool; that rerun must carry
        // an explanation, not a silent empty list
        let no_work = outcome
            .pairs
            .is_empty()
            .then_some(NoWorkReason::EvaluatorPoolExhausted);

        let registrations: HashMap<String, Registration> = filtered
            .cohorts
            .into_iter()
            .flat_map(|c| c.registrations)
            .map(|r| (r.registration_id.clone(), r))
            .collect();
        let evaluators: HashMap<String, Evaluator> = filtered
            .evaluators
            .into_iter()
            .map(|e| (e.evaluator_id.clone(), e))
            .collect();

        Ok(RunResult {
            scope: scope.clone(),
            config: config.clone(),
            pairs: outcome.pairs,
            cohorts: outcome.cohorts,
            shortfalls: outcome.shortfalls,
            registrations,
            evaluators,
            statistics,
            excluidos: filtered.report,
            no_work,
        })
    }

    /// Persist a planned result. The whole batch goes through one
    /// transaction; any row failure rolls everything back. Serialized per
    /// scope so two coordinators cannot double-commit the same target.
    #[instrument(skip(self, run), fields(scope = %run.scope, pares = run.pairs.len()))]
    pub fn commit(&self, run: &RunResult) -> RepositoryResult<CommitOutcome> {
        if run.pairs.is_empty() {
            return Ok(CommitOutcome {
                scope: run.scope.clone(),
                inserted: 0,
            });
        }

        let lock = self.locks.lock_for(&run.scope);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let rows: Vec<Assignment> = run
            .pairs
            .iter()
            .map(|pair| {
                Assignment::new(
                    &pair.registration_id,
                    &pair.evaluator_id,
                    run.scope.phase,
                    pair.status,
                )
            })
            .collect();

        let inserted = self.assignments.batch_insert(&rows)?;
        info!(inserted, "asignaciones confirmadas");

        Ok(CommitOutcome {
            scope: run.scope.clone(),
            inserted,
        })
    }

    fn empty_result(
        scope: &ScopeKey,
        config: &RunConfig,
        reason: NoWorkReason,
        excluidos: ExclusionReport,
        evaluators: Vec<Evaluator>,
    ) -> RunResult {
        info!(scope = %scope, razon = ?reason, "sin trabajo elegible");
        RunResult {
            scope: scope.clone(),
            config: config.clone(),
            pairs: Vec::new(),
            cohorts: Vec::new(),
            shortfalls: Vec::new(),
            registrations: HashMap::new(),
            evaluators: evaluators
                .into_iter()
                .map(|e| (e.evaluator_id.clone(), e))
                .collect(),
            statistics: RunStatistics {
                total_inscripciones: 0,
                total_evaluadores_utilizados: 0,
                cuota_por_evaluador: config.cuota_por_evaluador,
                grados_asignados: 0,
                distribucion_grados: Vec::new(),
                observaciones: 0,
            },
            excluidos,
            no_work: Some(reason),
        }
    }
}
