//! Active Assignment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    assignments::{into_status_error, models::AssignmentResponse},
    extensions::*,
    state::State,
};

/// Active Assignment Handler
///
/// Returns 404 when the job has no driver bound to it.
#[endpoint(
    tags("assignments"),
    summary = "Get Active Assignment",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AssignmentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let assignment = state
        .app
        .assignments
        .active_assignment(&session, job.into_inner().into())
        .await
        .map_err(into_status_error)?
        .ok_or_else(|| StatusError::not_found().brief("No active assignment"))?;

    Ok(Json(assignment.into()))
}
