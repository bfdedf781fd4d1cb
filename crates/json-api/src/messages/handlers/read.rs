//! Mark Messages Read Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    messages::{into_status_error, models::CountResponse},
    state::State,
};

/// Mark Messages Read Handler
///
/// Marks every unread message from the other participant as read and returns how many
/// changed. Repeating the call returns zero.
#[endpoint(
    tags("messages"),
    summary = "Mark Messages Read",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "messages.mark_read", skip(job, assignment, depot), err)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    assignment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CountResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let count = state
        .app
        .messages
        .mark_read(&session, job.into_inner().into(), assignment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(CountResponse { count }))
}
