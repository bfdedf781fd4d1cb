//! Assignment Records

use jiff::Timestamp;

use crate::{domain::jobs::records::JobUuid, session::DriverUuid, uuids::TypedUuid};

/// Assignment UUID
pub type AssignmentUuid = TypedUuid<AssignmentRecord>;

/// Binding of one driver to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub uuid: AssignmentUuid,
    pub job_uuid: JobUuid,
    pub driver_uuid: DriverUuid,
    pub accepted_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
}

impl AssignmentRecord {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}
