//! Unseen Jobs Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    drivers::{into_status_error, models::UnseenResponse},
    extensions::*,
    state::State,
};

/// Unseen Jobs Handler
#[endpoint(
    tags("drivers"),
    summary = "Unseen Job Count",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    driver: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<UnseenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let count = state
        .app
        .notifications
        .fetch_unseen_count(&session, driver.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(UnseenResponse { count }))
}
