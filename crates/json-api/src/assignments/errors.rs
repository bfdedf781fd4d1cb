//! Assignment Errors

use salvo::http::StatusError;
use tracing::error;

use haulage_app::domain::assignments::AssignmentsServiceError;

pub(crate) fn into_status_error(error: AssignmentsServiceError) -> StatusError {
    if let Some(brief) = error.brief() {
        return StatusError::conflict().brief(brief);
    }

    match error {
        AssignmentsServiceError::AlreadyTaken => StatusError::conflict(),
        AssignmentsServiceError::NotFound => StatusError::not_found(),
        AssignmentsServiceError::Forbidden => StatusError::forbidden(),
        AssignmentsServiceError::InvalidReference | AssignmentsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid assignment payload")
        }
        AssignmentsServiceError::Sql(source) => {
            error!("assignment storage failure: {source}");

            StatusError::service_unavailable()
        }
    }
}
