//! Tracking Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use haulage_app::domain::jobs::records::JobRecord;

use crate::jobs::models::{JobStatusBody, JobTypeBody, VehicleBody};

/// Tracking Response
///
/// Leaves out customer contact details and internal identifiers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TrackingResponse {
    pub job_type: JobTypeBody,
    pub status: JobStatusBody,
    pub pickup_address: String,
    pub delivery_address: String,
    pub vehicle: Option<VehicleBody>,
    pub accepted_at: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub updated_at: String,
}

impl From<JobRecord> for TrackingResponse {
    fn from(job: JobRecord) -> Self {
        Self {
            job_type: job.job_type.into(),
            status: job.state.status().into(),
            accepted_at: job.state.accepted_at().map(|at| at.to_string()),
            started_at: job.state.started_at().map(|at| at.to_string()),
            ended_at: job.state.ended_at().map(|at| at.to_string()),
            pickup_address: job.pickup_address,
            delivery_address: job.delivery_address,
            vehicle: job.vehicle.map(Into::into),
            updated_at: job.updated_at.to_string(),
        }
    }
}
