//! Messages service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::messages::data::MessageValidationError;

#[derive(Debug, Error)]
pub enum MessagesServiceError {
    #[error("message already exists")]
    AlreadyExists,

    /// The job/assignment pair does not exist.
    #[error("conversation not found")]
    NotFound,

    #[error("not a participant of this conversation")]
    Forbidden,

    #[error(transparent)]
    Validation(#[from] MessageValidationError),

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for MessagesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
