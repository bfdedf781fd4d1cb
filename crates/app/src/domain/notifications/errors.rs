//! Notifications service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationsServiceError {
    /// Drivers may only read or advance their own checkpoint.
    #[error("not permitted to access this driver's notifications")]
    Forbidden,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for NotificationsServiceError {
    fn from(error: Error) -> Self {
        Self::Sql(error)
    }
}
