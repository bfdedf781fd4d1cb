//! Assignments Data

use jiff::Timestamp;

use crate::{
    domain::{assignments::records::AssignmentUuid, jobs::records::JobUuid},
    session::DriverUuid,
};

/// New Assignment Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewAssignment {
    pub uuid: AssignmentUuid,
    pub job: JobUuid,
    pub driver: DriverUuid,
    pub accepted_at: Timestamp,
}
