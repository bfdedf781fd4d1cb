//! Assignment Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haulage_app::domain::assignments::records::AssignmentRecord;

/// Assignment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AssignmentResponse {
    pub uuid: Uuid,
    pub job_uuid: Uuid,
    pub driver_uuid: Uuid,
    pub accepted_at: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl From<AssignmentRecord> for AssignmentResponse {
    fn from(record: AssignmentRecord) -> Self {
        Self {
            uuid: record.uuid.into_uuid(),
            job_uuid: record.job_uuid.into_uuid(),
            driver_uuid: record.driver_uuid.into_uuid(),
            accepted_at: record.accepted_at.to_string(),
            started_at: record.started_at.map(|at| at.to_string()),
            ended_at: record.ended_at.map(|at| at.to_string()),
        }
    }
}
