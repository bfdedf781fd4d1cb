//! Jobs service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::jobs::{data::JobValidationError, state::InvalidTransition};

#[derive(Debug, Error)]
pub enum JobsServiceError {
    #[error("job already exists")]
    AlreadyExists,

    #[error("job not found")]
    NotFound,

    #[error("not permitted to act on this job")]
    Forbidden,

    #[error(transparent)]
    Validation(#[from] JobValidationError),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for JobsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
