//! Job Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use haulage_app::session::Actor;

use crate::{
    extensions::*,
    jobs::{
        into_status_error,
        models::{JobResponse, JobsResponse},
    },
    state::State,
};

/// Job Index Handler
///
/// Dealers see their own jobs; drivers see the open pool without customer details or
/// tracking tokens. Both lists are newest first.
#[endpoint(
    tags("jobs"),
    summary = "List Jobs",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<JobsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let jobs = match session.actor {
        Actor::Dealer(_) => state.app.jobs.list_dealer_jobs(&session).await,
        Actor::Driver(_) => state.app.jobs.list_open_jobs(&session).await,
    }
    .map_err(into_status_error)?;

    Ok(Json(JobsResponse {
        jobs: jobs
            .into_iter()
            .map(|job| JobResponse::for_session(&session, job))
            .collect(),
    }))
}
