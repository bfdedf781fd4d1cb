//! Driver Notification Errors

use salvo::http::StatusError;
use tracing::error;

use haulage_app::domain::notifications::NotificationsServiceError;

pub(crate) fn into_status_error(error: NotificationsServiceError) -> StatusError {
    match error {
        NotificationsServiceError::Forbidden => StatusError::forbidden(),
        NotificationsServiceError::InvalidData => StatusError::internal_server_error(),
        NotificationsServiceError::Sql(source) => {
            error!("notification storage failure: {source}");

            StatusError::service_unavailable()
        }
    }
}
