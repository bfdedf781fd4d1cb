//! Advance Job Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    jobs::{
        into_status_error,
        models::{JobResponse, JobStatusBody},
    },
    state::State,
};

/// Advance Job Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdvanceStatusRequest {
    pub status: JobStatusBody,
}

/// Advance Job Status Handler
///
/// `in_progress` and `completed` are driven by the assigned driver, `cancelled` and
/// `archived` by the owning dealer. Moves the lifecycle does not allow return 409.
#[endpoint(
    tags("jobs"),
    summary = "Advance Job Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status advanced"),
        (status_code = StatusCode::FORBIDDEN, description = "Not permitted for this job"),
        (status_code = StatusCode::NOT_FOUND, description = "Job not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(
    name = "jobs.advance_status",
    skip(job, json, depot),
    fields(job_uuid = tracing::field::Empty, target = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    json: JsonBody<AdvanceStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<JobResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;
    let job = job.into_inner();
    let target = json.into_inner().status;

    let span = tracing::Span::current();

    span.record("job_uuid", tracing::field::display(job));
    span.record("target", tracing::field::debug(target));

    let job = state
        .app
        .jobs
        .advance_status(&session, job.into(), target.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(JobResponse::for_session(&session, job)))
}
