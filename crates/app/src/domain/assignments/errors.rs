//! Assignments service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

/// Error brief returned to a driver who lost the race for a job.
pub const JOB_ALREADY_TAKEN: &str = "JOB_ALREADY_TAKEN";

#[derive(Debug, Error)]
pub enum AssignmentsServiceError {
    /// Another driver accepted the job first, or it is no longer open.
    #[error("job already taken")]
    AlreadyTaken,

    #[error("job not found")]
    NotFound,

    #[error("not permitted to act on this job")]
    Forbidden,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl AssignmentsServiceError {
    /// Stable machine-readable brief for conflict responses.
    #[must_use]
    pub const fn brief(&self) -> Option<&'static str> {
        match self {
            Self::AlreadyTaken => Some(JOB_ALREADY_TAKEN),
            _ => None,
        }
    }
}

impl From<Error> for AssignmentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            // Only the one-active-assignment index can collide on insert.
            Some(ErrorKind::UniqueViolation) => Self::AlreadyTaken,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
