//! Create Job Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haulage_app::domain::jobs::{data::NewJob, records::JobUuid};

use crate::{
    extensions::*,
    jobs::{
        into_status_error,
        models::{CustomerBody, JobResponse, JobTypeBody, VehicleBody},
    },
    state::State,
};

/// Create Job Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateJobRequest {
    /// Client-chosen job UUID; generated when omitted
    pub uuid: Option<Uuid>,
    pub job_type: JobTypeBody,
    pub pickup_address: String,
    pub delivery_address: String,
    pub vehicle: Option<VehicleBody>,
    pub customer: CustomerBody,
}

impl From<CreateJobRequest> for NewJob {
    fn from(request: CreateJobRequest) -> Self {
        NewJob {
            uuid: request.uuid.map_or_else(JobUuid::new, JobUuid::from_uuid),
            job_type: request.job_type.into(),
            pickup_address: request.pickup_address,
            delivery_address: request.delivery_address,
            vehicle: request.vehicle.map(Into::into),
            customer: request.customer.into(),
        }
    }
}

/// Create Job Handler
#[endpoint(
    tags("jobs"),
    summary = "Create Job",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Job created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid job"),
        (status_code = StatusCode::FORBIDDEN, description = "Dealer session required"),
        (status_code = StatusCode::CONFLICT, description = "Job already exists"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(name = "jobs.create", skip(json, depot, res), err)]
pub(crate) async fn handler(
    json: JsonBody<CreateJobRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<JobResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let job = state
        .app
        .jobs
        .create_job(&session, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/jobs/{}", job.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(JobResponse::for_session(&session, job)))
}
