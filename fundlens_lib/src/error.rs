//! Error type for the service layer.

use fundlens_query::{PlanError, ValidationError};

use crate::db::DbError;

/// Everything an entity service call can fail with.
#[derive(thiserror::Error, Debug)]
pub enum FundLensError {
    /// Caller input failed validation; nothing was queried.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("data store error: {0}")]
    DataStore(#[from] DbError),
    #[error("query plan error: {0}")]
    Plan(#[from] PlanError),
}

impl FundLensError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        FundLensError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = FundLensError::not_found("candidate", 42);
        assert_eq!(err.to_string(), "candidate '42' not found");
    }

    #[test]
    fn validation_is_transparent() {
        let err: FundLensError = ValidationError::invalid("page", "must be >= 1").into();
        assert_eq!(err.to_string(), "invalid value for 'page': must be >= 1");
    }
}
