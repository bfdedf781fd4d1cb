//! Accept Job Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use haulage_app::domain::assignments::AssignmentsServiceError;

use crate::{
    assignments::{into_status_error, models::AssignmentResponse},
    extensions::*,
    observability::record_accept_outcome,
    state::State,
};

/// Accept Job Handler
///
/// Claims an open job for the calling driver. Exactly one of any number of concurrent
/// accepts wins; the rest receive 409 with the `JOB_ALREADY_TAKEN` brief.
#[endpoint(
    tags("assignments"),
    summary = "Accept Job",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Job accepted"),
        (status_code = StatusCode::FORBIDDEN, description = "Driver session required"),
        (status_code = StatusCode::NOT_FOUND, description = "Job not found"),
        (status_code = StatusCode::CONFLICT, description = "Job already taken"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "assignments.accept",
    skip(job, depot, res),
    fields(job_uuid = tracing::field::Empty, outcome = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<AssignmentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;
    let job = job.into_inner();

    let span = tracing::Span::current();

    span.record("job_uuid", tracing::field::display(job));

    let Some(driver) = session.as_driver() else {
        span.record("outcome", "rejected");
        record_accept_outcome("rejected");

        return Err(StatusError::forbidden().brief("Driver session required"));
    };

    let result = state.app.assignments.accept_job(&session, job.into(), driver).await;

    let outcome = match &result {
        Ok(_) => "won",
        Err(AssignmentsServiceError::AlreadyTaken) => "taken",
        Err(_) => "rejected",
    };

    span.record("outcome", outcome);
    record_accept_outcome(outcome);

    let assignment = result.map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(assignment.into()))
}
