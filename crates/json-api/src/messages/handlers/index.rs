//! List Messages Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    messages::{into_status_error, models::MessagesResponse},
    state::State,
};

/// List Messages Handler
///
/// Messages come back oldest first, in the order they were stored.
#[endpoint(
    tags("messages"),
    summary = "List Messages",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    assignment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<MessagesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let messages = state
        .app
        .messages
        .list_messages(&session, job.into_inner().into(), assignment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(MessagesResponse {
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}
