use koltrack_core::CoreError;
use koltrack_db::DbError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("{0}")]
    Validation(String),
    /// The backing store failed. Carried unchanged; nothing is retried.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    pub(crate) fn kol_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "kol", id }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => Self::Validation(message),
            other => Self::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_validation_keeps_message() {
        let err: ServiceError = CoreError::Validation("name must not be empty".to_string()).into();
        assert_eq!(err.to_string(), "name must not be empty");
    }

    #[test]
    fn not_found_names_entity() {
        let id = Uuid::nil();
        let err = ServiceError::kol_not_found(id);
        assert_eq!(err.to_string(), format!("kol {id} not found"));
    }
}
