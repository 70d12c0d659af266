// ==========================================
// Motor de Asignación - Repository Errors
// ==========================================
// thiserror derive; rusqlite failures classified into domain-relevant
// variants so upper layers can react without string matching.
// ==========================================

use thiserror::Error;

/// Repository-layer error type
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== database errors =====
    #[error("registro no encontrado: {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("fallo de conexión a base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("fallo al adquirir lock de base de datos: {0}")]
    LockError(String),

    #[error("fallo de transacción: {0}")]
    DatabaseTransactionError(String),

    #[error("fallo de consulta: {0}")]
    DatabaseQueryError(String),

    #[error("violación de restricción única: {0}")]
    UniqueConstraintViolation(String),

    #[error("violación de clave foránea: {0}")]
    ForeignKeyViolation(String),

    // ===== data quality errors =====
    #[error("dato inválido (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== generic =====
    #[error("error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result alias for the repository layer
pub type RepositoryResult<T> = Result<T, RepositoryError>;
