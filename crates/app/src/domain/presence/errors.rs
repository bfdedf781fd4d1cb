//! Presence service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenceServiceError {
    #[error("conversation not found")]
    NotFound,

    #[error("not a participant of this conversation")]
    Forbidden,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PresenceServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
