// ==========================================
// Motor de Asignación - Engine Layer
// ==========================================
// Business rules only; engines never touch SQL. Every exclusion or
// relaxed placement carries an explicit reason.
// ==========================================

pub mod allocator;
pub mod exclusion;
pub mod group_planner;
pub mod load_index;
pub mod orchestrator;
pub mod statistics;

pub use allocator::{
    Allocator, AllocationOutcome, CandidatePair, CohortAllocation, RosterEntry, Shortfall,
};
pub use exclusion::{ExclusionCounts, ExclusionFilter, ExclusionReport, FilteredWork};
pub use group_planner::GroupPlanner;
pub use load_index::LoadIndex;
pub use orchestrator::{
    AssignmentOrchestrator, CommitOutcome, NoWorkReason, RunResult, ScopeKey,
};
pub use statistics::{CohortBreakdown, EvaluatorLoad, RunStatistics, StatisticsAggregator};
