// ==========================================
// Motor de Asignación - Group Planner
// ==========================================
// Buckets eligible registrations into cohorts by grade (never by a flat
// level label) and computes how many evaluators each cohort needs under the
// per-evaluator quota. Stateless engine, no SQL.
// ==========================================

use crate::config::RunConfig;
use crate::domain::cohort::Cohort;
use crate::domain::registration::Registration;
use crate::domain::types::GradeBucket;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub struct GroupPlanner;

impl GroupPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Evaluators needed for a cohort of `n` registrations:
    /// max(num_evaluadores, ceil(n / cuota_por_evaluador)).
    ///
    /// Guarantees no evaluator grades more than cuota_por_evaluador under
    /// even distribution while never dropping below the configured baseline.
    pub fn required_evaluators(n: usize, config: &RunConfig) -> usize {
        if n == 0 {
            return 0;
        }
        let by_quota = n.div_ceil(config.cuota_por_evaluador);
        by_quota.max(config.num_evaluadores)
    }

    /// Partition registrations into grade cohorts, ordered by (level, grade).
    ///
    /// Registrations inside a cohort are sorted by (institution, name, id) so
    /// repeated runs over identical input produce identical output. An empty
    /// input yields an empty cohort list, not an error.
    #[instrument(skip(self, registrations, config), fields(registrations = registrations.len()))]
    pub fn plan_cohorts(
        &self,
        registrations: Vec<Registration>,
        config: &RunConfig,
    ) -> Vec<Cohort> {
        let mut buckets: BTreeMap<GradeBucket, Vec<Registration>> = BTreeMap::new();
        for registration in registrations {
            buckets
                .entry(registration.bucket)
                .or_default()
                .push(registration);
        }

        let cohorts: Vec<Cohort> = buckets
            .into_iter()
            .map(|(bucket, mut members)| {
                members.sort_by(|a, b| {
                    (
                        a.institution_id.as_str(),
                        a.competitor_name.as_str(),
                        a.registration_id.as_str(),
                    )
                        .cmp(&(
                            b.institution_id.as_str(),
                            b.competitor_name.as_str(),
                            b.registration_id.as_str(),
                        ))
                });
                let required = Self::required_evaluators(members.len(), config);
                Cohort {
                    bucket,
                    registrations: members,
                    required_evaluators: required,
                }
            })
            .collect();

        for cohort in &cohorts {
            debug!(
                grado = %cohort.bucket,
                inscripciones = cohort.size(),
                evaluadores_requeridos = cohort.required_evaluators,
                "cohorte planificada"
            );
        }

        cohorts
    }
}

impl Default for GroupPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EducationalLevel, Phase};
    use std::collections::HashSet;

    fn reg(id: &str, grade: u8, institution: &str, name: &str) -> Registration {
        Registration {
            registration_id: id.to_string(),
            competitor_name: name.to_string(),
            area_id: "MAT".to_string(),
            institution_id: institution.to_string(),
            phase: Phase::Clasificacion,
            bucket: GradeBucket::new(EducationalLevel::Primaria, grade),
            assigned_evaluators: HashSet::new(),
        }
    }

    fn many(grade: u8, count: usize) -> Vec<Registration> {
        (0..count)
            .map(|i| reg(&format!("i{:03}", i), grade, "U1", &format!("C{:03}", i)))
            .collect()
    }

    #[test]
    fn test_required_evaluators_quota_overflow() {
        let config = RunConfig::default(); // num=2, cuota=30
        assert_eq!(GroupPlanner::required_evaluators(61, &config), 3);
        assert_eq!(GroupPlanner::required_evaluators(60, &config), 2);
        assert_eq!(GroupPlanner::required_evaluators(1, &config), 2);
        assert_eq!(GroupPlanner::required_evaluators(0, &config), 0);
        assert_eq!(GroupPlanner::required_evaluators(91, &config), 4);
    }

    #[test]
    fn test_cohorts_split_by_grade_not_level() {
        let mut regs = many(3, 2);
        regs.extend(many(5, 1).into_iter().map(|mut r| {
            r.registration_id = format!("x-{}", r.registration_id);
            r
        }));

        let planner = GroupPlanner::new();
        let cohorts = planner.plan_cohorts(regs, &RunConfig::default());

        assert_eq!(cohorts.len(), 2);
        assert_eq!(cohorts[0].bucket.grade, 3);
        assert_eq!(cohorts[0].size(), 2);
        assert_eq!(cohorts[1].bucket.grade, 5);
    }

    #[test]
    fn test_members_sorted_for_reproducibility() {
        let regs = vec![
            reg("i2", 3, "U2", "Zoe"),
            reg("i1", 3, "U1", "Ana"),
            reg("i3", 3, "U1", "Beto"),
        ];
        let planner = GroupPlanner::new();
        let cohorts = planner.plan_cohorts(regs, &RunConfig::default());

        let ids: Vec<_> = cohorts[0]
            .registrations
            .iter()
            .map(|r| r.registration_id.as_str())
            .collect();
        assert_eq!(ids, vec!["i1", "i3", "i2"]);
    }

    #[test]
    fn test_empty_input_yields_empty_cohorts() {
        let planner = GroupPlanner::new();
        assert!(planner
            .plan_cohorts(Vec::new(), &RunConfig::default())
            .is_empty());
    }
}
