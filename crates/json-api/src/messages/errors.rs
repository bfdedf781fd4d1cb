//! Message Errors

use salvo::http::StatusError;
use tracing::error;

use haulage_app::domain::{messages::MessagesServiceError, presence::PresenceServiceError};

pub(crate) fn into_status_error(error: MessagesServiceError) -> StatusError {
    match error {
        MessagesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Message already exists")
        }
        MessagesServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        MessagesServiceError::InvalidReference | MessagesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid message payload")
        }
        MessagesServiceError::NotFound => StatusError::not_found(),
        MessagesServiceError::Forbidden => StatusError::forbidden(),
        MessagesServiceError::Sql(source) => {
            error!("message storage failure: {source}");

            StatusError::service_unavailable()
        }
    }
}

pub(crate) fn presence_status_error(error: PresenceServiceError) -> StatusError {
    match error {
        PresenceServiceError::NotFound => StatusError::not_found(),
        PresenceServiceError::Forbidden => StatusError::forbidden(),
        PresenceServiceError::Sql(source) => {
            error!("presence lookup failure: {source}");

            StatusError::service_unavailable()
        }
    }
}
