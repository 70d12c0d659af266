// ==========================================
// Motor de Asignación de Evaluadores
// ==========================================
// Subsystem of the olympiad management platform: distributes competitor
// registrations across qualified evaluators per area/level/phase under
// capacity and conflict-of-interest constraints. Preview never writes;
// confirm persists atomically and reruns are idempotent.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Config layer - run configuration
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs / schema)
pub mod db;

// Logging
pub mod logging;

// API layer - caller-facing surface
pub mod api;

// ==========================================
// Core re-exports
// ==========================================

// Domain types
pub use domain::types::{AllocationMethod, EducationalLevel, GradeBucket, Phase};

// Domain entities
pub use domain::{Assignment, AssignmentStatus, Cohort, Evaluator, Registration, RelaxReason};

// Engines
pub use engine::{
    Allocator, AssignmentOrchestrator, CommitOutcome, ExclusionFilter, ExclusionReport,
    GroupPlanner, LoadIndex, NoWorkReason, RunResult, RunStatistics, ScopeKey,
    StatisticsAggregator,
};

// Config
pub use config::{ConfigManager, RunConfig};

// API
pub use api::{
    ApiError, AssignmentApi, AssignmentParams, AssignmentRow, AssignmentRunResponse,
    CsvExportAdapter, ExportAdapter,
};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Motor de Asignación de Evaluadores";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
