// ==========================================
// Motor de Asignación - Domain Layer
// ==========================================
// Entities and types only; no SQL, no I/O.
// ==========================================

pub mod assignment;
pub mod cohort;
pub mod evaluator;
pub mod registration;
pub mod types;

pub use assignment::{Assignment, AssignmentStatus, RelaxReason};
pub use cohort::Cohort;
pub use evaluator::Evaluator;
pub use registration::Registration;
pub use types::{AllocationMethod, EducationalLevel, GradeBucket, Phase};
