// ==========================================
// Motor de Asignación - API Layer
// ==========================================
// Converts raw caller input into typed engine calls and engine output into
// display-ready DTOs. No business rules live here.
// ==========================================

pub mod assignment_api;
pub mod error;
pub mod export;
pub mod validator;

pub use assignment_api::{
    AssignedEvaluator, AssignmentApi, AssignmentParams, AssignmentRow, AssignmentRunResponse,
};
pub use error::{ApiError, ApiResult};
pub use export::{CsvExportAdapter, ExportAdapter};
