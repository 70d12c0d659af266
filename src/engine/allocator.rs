// ==========================================
// Motor de Asignación - Allocator
// ==========================================
// Pairs registrations with evaluators inside each cohort, honoring:
// - distinctness: a (registration, evaluator) pair is never repeated,
//   neither against committed assignments nor inside the run
// - conflict of interest: an evaluator does not grade registrations from
//   their own institution (evitar_misma_institucion)
// - quota: an evaluator stays under cuota_por_evaluador while a compliant
//   alternative exists anywhere in the pool
// When every candidate is constrained, the placement is still made but
// tagged Relaxed{reason}; the engine never hard-fails mid-cohort. If the
// pool is smaller than the per-registration target, the registration gets
// the maximum achievable and the shortfall is reported.
//
// The round-robin cursor is cohort-local and advances after every roster
// placement: it balances load inside a cohort, not across cohorts.
// ==========================================

use crate::config::RunConfig;
use crate::domain::assignment::{AssignmentStatus, RelaxReason};
use crate::domain::cohort::Cohort;
use crate::domain::evaluator::Evaluator;
use crate::domain::types::GradeBucket;
use crate::engine::load_index::LoadIndex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument, warn};

// ==========================================
// Outcome types
// ==========================================

/// One computed (registration, evaluator) pairing, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub registration_id: String,
    pub evaluator_id: String,
    pub status: AssignmentStatus,
}

/// Run-local load taken by one evaluator inside a cohort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub evaluator_id: String,
    pub assigned: usize,
}

/// Realized allocation for one cohort
#[derive(Debug, Clone)]
pub struct CohortAllocation {
    pub bucket: GradeBucket,
    pub registrations: usize,
    pub required_evaluators: usize,
    /// Evaluators actually used, with their run-local counts, ordered by id
    pub roster: Vec<RosterEntry>,
}

/// Registration that could not reach its evaluator target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub registration_id: String,
    pub faltantes: usize,
}

#[derive(Debug, Default)]
pub struct AllocationOutcome {
    pub pairs: Vec<CandidatePair>,
    pub cohorts: Vec<CohortAllocation>,
    pub shortfalls: Vec<Shortfall>,
}

impl AllocationOutcome {
    pub fn relaxed_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.status.is_relaxed()).count()
    }
}

// ==========================================
// Allocator
// ==========================================

pub struct Allocator;

impl Allocator {
    pub fn new() -> Self {
        Self
    }

    /// Allocate evaluators for every cohort.
    ///
    /// `pool` is the exclusion-filtered evaluator set for the area; it is
    /// shared across cohorts, while each cohort selects its own roster of
    /// `required_evaluators` least-loaded members to round-robin over.
    #[instrument(skip_all, fields(cohorts = cohorts.len(), pool = pool.len()))]
    pub fn allocate(
        &self,
        cohorts: &[Cohort],
        pool: &[Evaluator],
        load_index: &LoadIndex,
        config: &RunConfig,
    ) -> AllocationOutcome {
        let mut outcome = AllocationOutcome::default();

        // ordered pool copy: determinism does not depend on caller ordering
        let mut pool: Vec<&Evaluator> = pool.iter().collect();
        pool.sort_by(|a, b| a.evaluator_id.cmp(&b.evaluator_id));

        let institutions: HashMap<&str, &str> = pool
            .iter()
            .map(|e| (e.evaluator_id.as_str(), e.institution_id.as_str()))
            .collect();

        // total load per evaluator across the whole run (committed + new)
        let mut run_load: HashMap<String, usize> = pool
            .iter()
            .map(|e| {
                (
                    e.evaluator_id.clone(),
                    load_index.evaluator_assigned_count(&e.evaluator_id),
                )
            })
            .collect();

        // pairs already taken per registration (committed + placed this run)
        let mut taken: HashMap<String, HashSet<String>> = HashMap::new();

        for cohort in cohorts {
            let roster_ids = Self::select_roster(&pool, &run_load, cohort.required_evaluators);
            let mut cursor = 0usize;
            let mut cohort_usage: BTreeMap<String, usize> = BTreeMap::new();

            debug!(
                grado = %cohort.bucket,
                inscripciones = cohort.size(),
                roster = roster_ids.len(),
                "asignando cohorte"
            );

            for registration in &cohort.registrations {
                let already = taken
                    .entry(registration.registration_id.clone())
                    .or_insert_with(|| {
                        load_index
                            .assigned_evaluators(&registration.registration_id)
                            .cloned()
                            .unwrap_or_default()
                    });
                let needed = config
                    .num_evaluadores
                    .saturating_sub(already.len());

                let mut missing = 0usize;
                for _ in 0..needed {
                    let placement = Self::place_one(
                        registration.registration_id.as_str(),
                        registration.institution_id.as_str(),
                        already,
                        &roster_ids,
                        &mut cursor,
                        &pool,
                        &institutions,
                        &run_load,
                        config,
                    );

                    match placement {
                        Some((evaluator_id, status)) => {
                            already.insert(evaluator_id.clone());
                            *run_load.entry(evaluator_id.clone()).or_insert(0) += 1;
                            *cohort_usage.entry(evaluator_id.clone()).or_insert(0) += 1;
                            outcome.pairs.push(CandidatePair {
                                registration_id: registration.registration_id.clone(),
                                evaluator_id,
                                status,
                            });
                        }
                        None => {
                            missing += 1;
                        }
                    }
                }

                if missing > 0 {
                    warn!(
                        inscripcion = %registration.registration_id,
                        faltantes = missing,
                        "pool de evaluadores insuficiente para la inscripción"
                    );
                    outcome.shortfalls.push(Shortfall {
                        registration_id: registration.registration_id.clone(),
                        faltantes: missing,
                    });
                }
            }

            outcome.cohorts.push(CohortAllocation {
                bucket: cohort.bucket,
                registrations: cohort.size(),
                required_evaluators: cohort.required_evaluators,
                roster: cohort_usage
                    .into_iter()
                    .map(|(evaluator_id, assigned)| RosterEntry {
                        evaluator_id,
                        assigned,
                    })
                    .collect(),
            });
        }

        outcome
    }

    /// Pick the cohort roster: the `required` least-loaded pool members,
    /// ties broken by id so runs are reproducible.
    fn select_roster(
        pool: &[&Evaluator],
        run_load: &HashMap<String, usize>,
        required: usize,
    ) -> Vec<String> {
        let mut candidates: Vec<&&Evaluator> = pool.iter().collect();
        candidates.sort_by(|a, b| {
            let la = run_load.get(&a.evaluator_id).copied().unwrap_or(0);
            let lb = run_load.get(&b.evaluator_id).copied().unwrap_or(0);
            la.cmp(&lb).then_with(|| a.evaluator_id.cmp(&b.evaluator_id))
        });
        candidates
            .into_iter()
            .take(required)
            .map(|e| e.evaluator_id.clone())
            .collect()
    }

    /// Place a single evaluator for one registration.
    ///
    /// Resolution order:
    /// 1. compliant roster member, scanned round-robin from the cursor
    /// 2. compliant member of the wider pool (roster extension)
    /// 3. relaxed placement, preferring a quota overrun over an
    ///    institution conflict
    /// Returns None only when every pool member is already paired with the
    /// registration (pool smaller than the target).
    #[allow(clippy::too_many_arguments)]
    fn place_one(
        registration_id: &str,
        registration_institution: &str,
        already: &HashSet<String>,
        roster_ids: &[String],
        cursor: &mut usize,
        pool: &[&Evaluator],
        institutions: &HashMap<&str, &str>,
        run_load: &HashMap<String, usize>,
        config: &RunConfig,
    ) -> Option<(String, AssignmentStatus)> {
        let institution_conflict = |evaluator_id: &str| {
            config.evitar_misma_institucion
                && institutions
                    .get(evaluator_id)
                    .is_some_and(|inst| *inst == registration_institution)
        };
        let over_quota = |evaluator_id: &str| {
            run_load.get(evaluator_id).copied().unwrap_or(0) >= config.cuota_por_evaluador
        };

        // 1. round-robin over the roster
        if !roster_ids.is_empty() {
            for offset in 0..roster_ids.len() {
                let idx = (*cursor + offset) % roster_ids.len();
                let id = &roster_ids[idx];
                if already.contains(id) || institution_conflict(id) || over_quota(id) {
                    continue;
                }
                *cursor = (idx + 1) % roster_ids.len();
                return Some((id.clone(), AssignmentStatus::Compliant));
            }
        }

        // 2. compliant alternative anywhere in the pool
        let mut fallback: Vec<&&Evaluator> = pool
            .iter()
            .filter(|e| !already.contains(&e.evaluator_id))
            .collect();
        fallback.sort_by(|a, b| {
            let la = run_load.get(&a.evaluator_id).copied().unwrap_or(0);
            let lb = run_load.get(&b.evaluator_id).copied().unwrap_or(0);
            la.cmp(&lb).then_with(|| a.evaluator_id.cmp(&b.evaluator_id))
        });

        if let Some(e) = fallback
            .iter()
            .find(|e| !institution_conflict(&e.evaluator_id) && !over_quota(&e.evaluator_id))
        {
            return Some((e.evaluator_id.clone(), AssignmentStatus::Compliant));
        }

        // 3. relaxed: overload a compliant-institution evaluator before
        //    accepting a conflict of interest
        if let Some(e) = fallback
            .iter()
            .find(|e| !institution_conflict(&e.evaluator_id))
        {
            debug!(
                inscripcion = registration_id,
                evaluador = %e.evaluator_id,
                "colocación con cuota excedida"
            );
            return Some((
                e.evaluator_id.clone(),
                AssignmentStatus::Relaxed {
                    reason: RelaxReason::QuotaExceeded,
                },
            ));
        }

        fallback.first().map(|e| {
            debug!(
                inscripcion = registration_id,
                evaluador = %e.evaluator_id,
                "colocación con conflicto de institución"
            );
            (
                e.evaluator_id.clone(),
                AssignmentStatus::Relaxed {
                    reason: RelaxReason::SameInstitution,
                },
            )
        })
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}
