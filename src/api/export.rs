// ==========================================
// Motor de Asignación - Export Adapter
// ==========================================
// Downstream collaborators render a committed result set to a spreadsheet.
// The engine only promises the same rows it shows in preview; the adapter
// seam keeps the rendering replaceable (CSV here, XLSX elsewhere).
// ==========================================

use crate::api::assignment_api::AssignmentRow;
use crate::api::error::{ApiError, ApiResult};

pub trait ExportAdapter {
    /// Render result rows into a downloadable byte stream
    fn render(&self, rows: &[AssignmentRow]) -> ApiResult<Vec<u8>>;
}

/// CSV rendering: one line per (registration, evaluator) pairing
pub struct CsvExportAdapter;

impl CsvExportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvExportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportAdapter for CsvExportAdapter {
    fn render(&self, rows: &[AssignmentRow]) -> ApiResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record([
                "inscripcion_id",
                "competidor",
                "area",
                "grado",
                "institucion",
                "evaluador_id",
                "evaluador",
                "email",
                "institucion_evaluador",
                "observacion",
            ])
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        for row in rows {
            for evaluador in &row.evaluadores {
                let (estado, motivo) = evaluador.estado.to_columns();
                let observacion = match motivo {
                    Some(m) => format!("{}:{}", estado, m),
                    None => estado.to_string(),
                };
                writer
                    .write_record([
                        row.inscripcion_id.as_str(),
                        row.competidor.as_str(),
                        row.area_id.as_str(),
                        row.grado.as_str(),
                        row.institucion_id.as_str(),
                        evaluador.evaluador_id.as_str(),
                        evaluador.nombre.as_str(),
                        evaluador.email.as_str(),
                        evaluador.institucion_id.as_str(),
                        observacion.as_str(),
                    ])
                    .map_err(|e| ApiError::InternalError(e.to_string()))?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }
}
