//! Job Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{domain::jobs::tracking::TrackingToken, session::DealerUuid, uuids::TypedUuid};

/// Job UUID
pub type JobUuid = TypedUuid<JobRecord>;

/// Kind of work a job describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobType {
    Delivery,
    Swap,
}

impl JobType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Swap => "swap",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown job type: {0}")]
pub struct UnknownJobType(pub String);

impl FromStr for JobType {
    type Err = UnknownJobType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "delivery" => Ok(Self::Delivery),
            "swap" => Ok(Self::Swap),
            other => Err(UnknownJobType(other.to_string())),
        }
    }
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
    Archived,
}

impl JobStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Archived,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Archived)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown job status: {0}")]
pub struct UnknownJobStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownJobStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownJobStatus(value.to_string()))
    }
}

/// Job status together with the lifecycle timestamps that status guarantees.
///
/// A completed job always carries `ended_at`, an open job never carries `accepted_at`,
/// and so on: combinations the lifecycle cannot produce have no representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Open,
    Assigned {
        accepted_at: Timestamp,
    },
    InProgress {
        accepted_at: Timestamp,
        started_at: Timestamp,
    },
    Completed {
        accepted_at: Timestamp,
        started_at: Timestamp,
        ended_at: Timestamp,
    },
    Cancelled {
        accepted_at: Option<Timestamp>,
        ended_at: Timestamp,
    },
    Archived {
        accepted_at: Timestamp,
        started_at: Timestamp,
        ended_at: Timestamp,
    },
}

impl JobState {
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        match self {
            Self::Open => JobStatus::Open,
            Self::Assigned { .. } => JobStatus::Assigned,
            Self::InProgress { .. } => JobStatus::InProgress,
            Self::Completed { .. } => JobStatus::Completed,
            Self::Cancelled { .. } => JobStatus::Cancelled,
            Self::Archived { .. } => JobStatus::Archived,
        }
    }

    #[must_use]
    pub const fn accepted_at(&self) -> Option<Timestamp> {
        match *self {
            Self::Open => None,
            Self::Cancelled { accepted_at, .. } => accepted_at,
            Self::Assigned { accepted_at }
            | Self::InProgress { accepted_at, .. }
            | Self::Completed { accepted_at, .. }
            | Self::Archived { accepted_at, .. } => Some(accepted_at),
        }
    }

    #[must_use]
    pub const fn started_at(&self) -> Option<Timestamp> {
        match *self {
            Self::Open | Self::Assigned { .. } | Self::Cancelled { .. } => None,
            Self::InProgress { started_at, .. }
            | Self::Completed { started_at, .. }
            | Self::Archived { started_at, .. } => Some(started_at),
        }
    }

    #[must_use]
    pub const fn ended_at(&self) -> Option<Timestamp> {
        match *self {
            Self::Open | Self::Assigned { .. } | Self::InProgress { .. } => None,
            Self::Completed { ended_at, .. }
            | Self::Cancelled { ended_at, .. }
            | Self::Archived { ended_at, .. } => Some(ended_at),
        }
    }
}

/// Vehicle being delivered or swapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vehicle {
    pub year: Option<i16>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub vin: Option<String>,
}

impl Vehicle {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.make.is_none() && self.model.is_none() && self.vin.is_none()
    }
}

/// End customer receiving the vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Job Record
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub uuid: JobUuid,
    pub dealer_uuid: DealerUuid,
    pub job_type: JobType,
    pub state: JobState,
    pub pickup_address: String,
    pub delivery_address: String,
    pub vehicle: Option<Vehicle>,
    pub customer: Customer,
    pub tracking_token: TrackingToken,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JobRecord {
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.state.status()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, JobState::Open)
    }
}
