//! Seen Checkpoint Handlers

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    drivers::{into_status_error, models::SeenResponse},
    extensions::*,
    state::State,
};

/// Mark Seen Handler
///
/// Moves the driver's checkpoint to now. Jobs created after this point count as unseen.
#[endpoint(
    tags("drivers"),
    summary = "Mark Jobs Seen",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "drivers.mark_seen", skip(driver, depot), err)]
pub(crate) async fn mark_handler(
    driver: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<SeenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let seen_at = state
        .app
        .notifications
        .mark_seen(&session, driver.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(SeenResponse {
        last_seen_at: Some(seen_at.to_string()),
    }))
}

/// Last Seen Handler
#[endpoint(
    tags("drivers"),
    summary = "Last Seen Checkpoint",
    security(("bearer_auth" = []))
)]
pub(crate) async fn get_handler(
    driver: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<SeenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let last_seen = state
        .app
        .notifications
        .last_seen(&session, driver.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(SeenResponse {
        last_seen_at: last_seen.map(|at| at.to_string()),
    }))
}
