// ==========================================
// Motor de Asignación - API Errors
// ==========================================
// Converts repository-level failures into caller-facing errors. Zero new
// assignments is NOT an error (see NoWorkReason); neither are relaxed
// placements, which travel as data on the result rows.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== validation =====
    #[error("entrada inválida: {0}")]
    ValidationError(String),

    #[error("método de asignación no soportado: {0}")]
    UnsupportedMethod(String),

    // ===== persistence =====
    /// Commit failed; the whole batch was rolled back. Rerunning is the
    /// intended recovery path (exclusion makes reruns idempotent).
    #[error("fallo de persistencia, lote revertido: {0}")]
    PersistenceFailure(String),

    #[error("recurso no encontrado: {0}")]
    NotFound(String),

    // ===== generic =====
    #[error("error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("campo {}: {}", field, message))
            }
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg) => ApiError::PersistenceFailure(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result alias for the API layer
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::UniqueConstraintViolation(
            "UNIQUE constraint failed".to_string(),
        )
        .into();
        assert!(matches!(err, ApiError::PersistenceFailure(_)));

        let err: ApiError = RepositoryError::FieldValueError {
            field: "grado".to_string(),
            message: "fuera de rango".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
