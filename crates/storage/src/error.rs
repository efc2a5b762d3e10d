use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::Database(e)) => e.code().as_deref() == Some("23505"),
            StorageError::ConstraintViolation(_) => true,
            _ => false,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_violation_counts_as_unique_violation() {
        let err = StorageError::ConstraintViolation("scores_pkey".to_string());
        assert!(err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
    }

    #[test]
    fn not_found_is_not_a_violation() {
        assert!(!StorageError::NotFound.is_unique_violation());
        assert!(!StorageError::NotFound.is_foreign_key_violation());
        assert!(!StorageError::Unavailable("down".to_string()).is_foreign_key_violation());
    }
}
