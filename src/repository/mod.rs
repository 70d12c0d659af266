// ==========================================
// Motor de Asignación - Repository Layer
// ==========================================
// Data access over SQLite; the engine layer never touches SQL directly.
// ==========================================

pub mod assignment_repo;
pub mod catalog;
pub mod error;
pub mod evaluator_repo;
pub mod registration_repo;

#[cfg(test)]
pub mod test_support;

pub use assignment_repo::AssignmentRepository;
pub use catalog::{CatalogGateway, SqliteCatalogGateway};
pub use error::{RepositoryError, RepositoryResult};
pub use evaluator_repo::EvaluatorRepository;
pub use registration_repo::RegistrationRepository;
