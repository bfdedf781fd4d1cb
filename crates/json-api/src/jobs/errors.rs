//! Job Errors

use salvo::http::StatusError;
use tracing::error;

use haulage_app::domain::jobs::JobsServiceError;

pub(crate) fn into_status_error(error: JobsServiceError) -> StatusError {
    match error {
        JobsServiceError::AlreadyExists => StatusError::conflict().brief("Job already exists"),
        JobsServiceError::Validation(source) => StatusError::bad_request().brief(source.to_string()),
        JobsServiceError::InvalidTransition(source) => {
            StatusError::conflict().brief(source.to_string())
        }
        JobsServiceError::InvalidReference
        | JobsServiceError::MissingRequiredData
        | JobsServiceError::InvalidData => StatusError::bad_request().brief("Invalid job payload"),
        JobsServiceError::Forbidden => StatusError::forbidden(),
        JobsServiceError::NotFound => StatusError::not_found(),
        JobsServiceError::Sql(source) => {
            error!("job storage failure: {source}");

            StatusError::service_unavailable()
        }
    }
}
