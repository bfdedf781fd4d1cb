//! Get Job Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    jobs::{into_status_error, models::JobResponse},
    state::State,
};

/// Get Job Handler
#[endpoint(
    tags("jobs"),
    summary = "Get Job",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<JobResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let job = state
        .app
        .jobs
        .get_job(&session, job.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(JobResponse::for_session(&session, job)))
}
