// ==========================================
// Motor de Asignación - Assignment API
// ==========================================
// Caller-facing surface consumed by the UI and export collaborators.
// Accepts raw labels, resolves configuration (defaults -> config_kv
// overrides -> per-run params), runs the preview pipeline and optionally
// confirms it. Preview is the default: confirmar=false never writes.
// ==========================================

use crate::api::error::ApiResult;
use crate::api::validator;
use crate::config::{ConfigManager, RunConfig};
use crate::domain::assignment::AssignmentStatus;
use crate::engine::orchestrator::{AssignmentOrchestrator, CommitOutcome, RunResult, ScopeKey};
use crate::engine::{ExclusionReport, RunStatistics};
use crate::repository::catalog::CatalogGateway;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};

// ==========================================
// Request / response DTOs
// ==========================================

/// Raw run request as the UI sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentParams {
    pub area_id: String,
    pub nivel: String,
    pub fase: String,
    #[serde(default)]
    pub ronda: Option<String>,
    #[serde(default)]
    pub num_evaluadores: Option<usize>,
    #[serde(default)]
    pub cuota_por_evaluador: Option<usize>,
    #[serde(default)]
    pub metodo: Option<String>,
    #[serde(default)]
    pub evitar_misma_institucion: Option<bool>,
    #[serde(default)]
    pub evitar_misma_area: Option<bool>,
    #[serde(default)]
    pub confirmar: bool,
}

/// One evaluator as shown on a result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedEvaluator {
    pub evaluador_id: String,
    pub nombre: String,
    pub email: String,
    pub institucion_id: String,
    /// Compliant, or relaxed with the tagged reason (observación)
    #[serde(flatten)]
    pub estado: AssignmentStatus,
}

/// One result row: a registration with its newly planned evaluators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    pub inscripcion_id: String,
    pub competidor: String,
    pub area_id: String,
    pub nivel: String,
    pub grado: String,
    pub institucion_id: String,
    pub evaluadores: Vec<AssignedEvaluator>,
    /// True when any placement on this row is relaxed
    pub observacion: bool,
    /// Evaluators still missing when the pool was smaller than the target
    pub faltantes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRunResponse {
    pub items: Vec<AssignmentRow>,
    pub estadisticas: RunStatistics,
    pub excluidos: ExclusionReport,
    /// Present when zero new assignments were produced; explains why
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
    /// Present only on confirmed runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmado: Option<CommitOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ronda: Option<String>,
}

// ==========================================
// AssignmentApi
// ==========================================

pub struct AssignmentApi<G: CatalogGateway> {
    orchestrator: AssignmentOrchestrator<G>,
    config: ConfigManager,
}

impl<G: CatalogGateway> AssignmentApi<G> {
    pub fn new(orchestrator: AssignmentOrchestrator<G>, config: ConfigManager) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Run an assignment request: preview by default, commit when
    /// `confirmar` is set. The response shape is identical either way so
    /// the UI renders previews and confirmed runs with the same code.
    #[instrument(skip(self, params), fields(area = %params.area_id, confirmar = params.confirmar))]
    pub fn run(&self, params: &AssignmentParams) -> ApiResult<AssignmentRunResponse> {
        let (scope, run_config) = self.resolve(params)?;

        let run = self.orchestrator.plan(&scope, &run_config)?;

        let confirmado = if params.confirmar && !run.pairs.is_empty() {
            Some(self.orchestrator.commit(&run)?)
        } else {
            None
        };

        if let Some(outcome) = &confirmado {
            info!(inserted = outcome.inserted, "corrida confirmada");
        }

        Ok(Self::build_response(run, confirmado, params.ronda.clone()))
    }

    /// Resolve selectors and configuration. Per-run params override
    /// config_kv overrides, which override compiled-in defaults.
    fn resolve(&self, params: &AssignmentParams) -> ApiResult<(ScopeKey, RunConfig)> {
        let area_id = validator::require_area(&params.area_id)?;
        let level = validator::parse_level(&params.nivel)?;
        let phase = validator::parse_phase(&params.fase)?;

        let mut config = self.config.load_run_config()?;
        if let Some(v) = params.num_evaluadores {
            config.num_evaluadores = v;
        }
        if let Some(v) = params.cuota_por_evaluador {
            config.cuota_por_evaluador = v;
        }
        if let Some(metodo) = &params.metodo {
            config.metodo = validator::parse_supported_method(metodo)?;
        } else {
            // config_kv may also carry BALANCEADO; same rejection applies
            validator::parse_supported_method(config.metodo.as_str())?;
        }
        if let Some(v) = params.evitar_misma_institucion {
            config.evitar_misma_institucion = v;
        }
        if let Some(v) = params.evitar_misma_area {
            config.evitar_misma_area = v;
        }
        config
            .validate()
            .map_err(crate::api::error::ApiError::ValidationError)?;

        let scope = ScopeKey {
            area_id,
            level,
            phase,
            ronda: params.ronda.clone(),
        };
        Ok((scope, config))
    }

    fn build_response(
        run: RunResult,
        confirmado: Option<CommitOutcome>,
        ronda: Option<String>,
    ) -> AssignmentRunResponse {
        let mensaje = run.mensaje().map(str::to_string);

        // pairs grouped by registration, preserving allocation order
        let mut by_registration: HashMap<&str, Vec<&crate::engine::CandidatePair>> =
            HashMap::new();
        let mut row_order: Vec<&str> = Vec::new();
        for pair in &run.pairs {
            let entry = by_registration
                .entry(pair.registration_id.as_str())
                .or_default();
            if entry.is_empty() {
                row_order.push(pair.registration_id.as_str());
            }
            entry.push(pair);
        }

        let shortfalls: HashMap<&str, usize> = run
            .shortfalls
            .iter()
            .map(|s| (s.registration_id.as_str(), s.faltantes))
            .collect();

        // a registration whose target could not be advanced at all still
        // gets a row, so its faltantes stay visible to the operator
        for shortfall in &run.shortfalls {
            if !by_registration.contains_key(shortfall.registration_id.as_str()) {
                row_order.push(shortfall.registration_id.as_str());
            }
        }

        let items: Vec<AssignmentRow> = row_order
            .into_iter()
            .filter_map(|registration_id| {
                let registration = run.registrations.get(registration_id)?;

                let evaluadores: Vec<AssignedEvaluator> = by_registration
                    .get(registration_id)
                    .into_iter()
                    .flatten()
                    .filter_map(|pair| {
                        run.evaluators.get(&pair.evaluator_id).map(|e| {
                            AssignedEvaluator {
                                evaluador_id: e.evaluator_id.clone(),
                                nombre: e.name.clone(),
                                email: e.email.clone(),
                                institucion_id: e.institution_id.clone(),
                                estado: pair.status,
                            }
                        })
                    })
                    .collect();

                Some(AssignmentRow {
                    inscripcion_id: registration.registration_id.clone(),
                    competidor: registration.competitor_name.clone(),
                    area_id: registration.area_id.clone(),
                    nivel: registration.bucket.level.to_string(),
                    grado: registration.bucket.label(),
                    institucion_id: registration.institution_id.clone(),
                    observacion: evaluadores.iter().any(|e| e.estado.is_relaxed()),
                    faltantes: shortfalls
                        .get(registration_id)
                        .copied()
                        .unwrap_or(0),
                    evaluadores,
                })
            })
            .collect();

        AssignmentRunResponse {
            items,
            estadisticas: run.statistics,
            excluidos: run.excluidos,
            mensaje,
            confirmado,
            ronda,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::repository::assignment_repo::AssignmentRepository;
    use crate::repository::catalog::SqliteCatalogGateway;
    use crate::repository::test_support::{insert_evaluator, insert_registration, setup_test_db};
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn api(conn: Arc<Mutex<Connection>>) -> AssignmentApi<SqliteCatalogGateway> {
        AssignmentApi::new(
            AssignmentOrchestrator::new(
                SqliteCatalogGateway::new(conn.clone()),
                AssignmentRepository::new(conn.clone()),
            ),
            ConfigManager::new(conn),
        )
    }

    fn params(confirmar: bool) -> AssignmentParams {
        AssignmentParams {
            area_id: "MAT".to_string(),
            nivel: "PRIMARIA".to_string(),
            fase: "FINAL".to_string(),
            ronda: None,
            num_evaluadores: None,
            cuota_por_evaluador: None,
            metodo: None,
            evitar_misma_institucion: None,
            evitar_misma_area: None,
            confirmar,
        }
    }

    fn seed(conn: &Arc<Mutex<Connection>>) {
        insert_registration(conn, "i1", "Ana", "MAT", "PRIMARIA", 3, "U1", "FINAL");
        insert_registration(conn, "i2", "Beto", "MAT", "PRIMARIA", 4, "U2", "FINAL");
        insert_evaluator(conn, "e1", "Luis", "V1", &["MAT"]);
        insert_evaluator(conn, "e2", "Mora", "V2", &["MAT"]);
        insert_evaluator(conn, "e3", "Nora", "V3", &["MAT"]);
    }

    #[test]
    fn test_preview_produces_rows_without_writing() {
        let conn = setup_test_db();
        seed(&conn);

        let response = api(conn.clone()).run(&params(false)).unwrap();

        assert_eq!(response.items.len(), 2);
        assert!(response.confirmado.is_none());
        assert!(response.mensaje.is_none());
        // two grade cohorts, one registration each
        assert_eq!(response.estadisticas.grados_asignados, 2);
        for row in &response.items {
            assert_eq!(row.evaluadores.len(), 2);
            assert!(!row.observacion);
            assert_eq!(row.faltantes, 0);
        }

        let n: i64 = conn
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM asignacion_evaluador", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_confirm_persists_and_rerun_reports_excluded() {
        let conn = setup_test_db();
        seed(&conn);
        let api = api(conn);

        let confirmed = api.run(&params(true)).unwrap();
        assert_eq!(confirmed.confirmado.as_ref().unwrap().inserted, 4);

        let rerun = api.run(&params(false)).unwrap();
        assert!(rerun.items.is_empty());
        assert_eq!(rerun.excluidos.inscripciones.con_asignacion, 2);
        assert!(rerun
            .mensaje
            .as_deref()
            .unwrap()
            .contains("ya tienen sus evaluadores"));
    }

    #[test]
    fn test_missing_area_is_validation_error() {
        let conn = setup_test_db();
        let mut p = params(false);
        p.area_id = "  ".to_string();
        assert!(matches!(
            api(conn).run(&p),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_balanceado_rejected() {
        let conn = setup_test_db();
        let mut p = params(false);
        p.metodo = Some("BALANCEADO".to_string());
        assert!(matches!(
            api(conn).run(&p),
            Err(ApiError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_params_override_config_kv_defaults() {
        let conn = setup_test_db();
        seed(&conn);
        let api = api(conn);
        api.config
            .set_config_value(crate::config::config_manager::KEY_NUM_EVALUADORES, "3")
            .unwrap();

        // per-run param wins over the stored override
        let mut p = params(false);
        p.num_evaluadores = Some(1);
        let response = api.run(&p).unwrap();
        assert!(response.items.iter().all(|r| r.evaluadores.len() == 1));

        // without the param the stored override applies
        let response = api.run(&params(false)).unwrap();
        assert!(response.items.iter().all(|r| r.evaluadores.len() == 3));
    }

    #[test]
    fn test_rerun_after_shortfall_commit_keeps_row_and_message() {
        let conn = setup_test_db();
        insert_registration(&conn, "i1", "Ana", "MAT", "PRIMARIA", 3, "U1", "FINAL");
        insert_evaluator(&conn, "e1", "Luis", "V1", &["MAT"]);
        insert_evaluator(&conn, "e2", "Mora", "V2", &["MAT"]);
        let api = api(conn);

        // target of 3 over a pool of 2: the achievable pair set is committed
        let mut p = params(true);
        p.num_evaluadores = Some(3);
        let confirmed = api.run(&p).unwrap();
        assert_eq!(confirmed.confirmado.as_ref().unwrap().inserted, 2);
        assert_eq!(confirmed.items[0].faltantes, 1);

        // the rerun produces zero new pairs, but neither the pending
        // registration nor the explanation may disappear
        let mut p = params(false);
        p.num_evaluadores = Some(3);
        let rerun = api.run(&p).unwrap();
        assert!(rerun.confirmado.is_none());
        assert_eq!(rerun.items.len(), 1);
        assert!(rerun.items[0].evaluadores.is_empty());
        assert_eq!(rerun.items[0].faltantes, 1);
        assert_eq!(rerun.excluidos.inscripciones.disponibles, 1);
        assert!(rerun
            .mensaje
            .as_deref()
            .unwrap()
            .contains("todos los evaluadores disponibles"));
    }

    #[test]
    fn test_relaxed_rows_carry_observacion_flag() {
        let conn = setup_test_db();
        // the only evaluator shares the registration's institution
        insert_registration(&conn, "i1", "Ana", "MAT", "PRIMARIA", 3, "U1", "FINAL");
        insert_evaluator(&conn, "e1", "Luis", "U1", &["MAT"]);

        let mut p = params(false);
        p.num_evaluadores = Some(1);
        let response = api(conn).run(&p).unwrap();

        assert_eq!(response.items.len(), 1);
        assert!(response.items[0].observacion);
        assert!(response.items[0].evaluadores[0].estado.is_relaxed());
    }
}
