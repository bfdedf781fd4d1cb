//! Job Models

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haulage_app::{
    domain::jobs::records::{Customer, JobRecord, JobStatus, JobType, Vehicle},
    session::Session,
};

/// Kind of job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum JobTypeBody {
    Delivery,
    Swap,
}

impl From<JobTypeBody> for JobType {
    fn from(body: JobTypeBody) -> Self {
        match body {
            JobTypeBody::Delivery => JobType::Delivery,
            JobTypeBody::Swap => JobType::Swap,
        }
    }
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum JobStatusBody {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
    Archived,
}

impl From<JobStatusBody> for JobStatus {
    fn from(body: JobStatusBody) -> Self {
        match body {
            JobStatusBody::Open => JobStatus::Open,
            JobStatusBody::Assigned => JobStatus::Assigned,
            JobStatusBody::InProgress => JobStatus::InProgress,
            JobStatusBody::Completed => JobStatus::Completed,
            JobStatusBody::Cancelled => JobStatus::Cancelled,
            JobStatusBody::Archived => JobStatus::Archived,
        }
    }
}

/// Vehicle details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct VehicleBody {
    pub year: Option<i16>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub vin: Option<String>,
}

impl From<VehicleBody> for Vehicle {
    fn from(body: VehicleBody) -> Self {
        Vehicle {
            year: body.year,
            make: body.make,
            model: body.model,
            vin: body.vin,
        }
    }
}

impl From<Vehicle> for VehicleBody {
    fn from(vehicle: Vehicle) -> Self {
        VehicleBody {
            year: vehicle.year,
            make: vehicle.make,
            model: vehicle.model,
            vin: vehicle.vin,
        }
    }
}

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerBody {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<CustomerBody> for Customer {
    fn from(body: CustomerBody) -> Self {
        Customer {
            name: body.name,
            phone: body.phone,
            email: body.email,
        }
    }
}

impl From<Customer> for CustomerBody {
    fn from(customer: Customer) -> Self {
        CustomerBody {
            name: customer.name,
            phone: customer.phone,
            email: customer.email,
        }
    }
}

/// How much of a job a viewer is entitled to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobView {
    /// The owning dealer: everything.
    Owner,
    /// The assigned driver: customer contact, no tracking token.
    Assignee,
    /// Any driver browsing the open pool: no customer or tracking token.
    Pool,
}

impl JobView {
    /// View for a job the jobs service already showed to `session`.
    ///
    /// Drivers only see non-open jobs they hold the assignment for.
    pub(crate) fn for_session(session: &Session, job: &JobRecord) -> Self {
        if session.is_dealer(job.dealer_uuid) {
            Self::Owner
        } else if job.status() == JobStatus::Open {
            Self::Pool
        } else {
            Self::Assignee
        }
    }

    /// View for a job event pushed to `session`.
    ///
    /// Streams are never narrowed per assignment, so drivers get the pool view.
    pub(crate) fn streamed(session: &Session, job: &JobRecord) -> Self {
        if session.is_dealer(job.dealer_uuid) {
            Self::Owner
        } else {
            Self::Pool
        }
    }
}

/// A job as seen by one viewer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct JobResponse {
    pub uuid: Uuid,
    pub dealer_uuid: Uuid,
    pub job_type: JobTypeBody,
    pub status: JobStatusBody,
    pub pickup_address: String,
    pub delivery_address: String,
    pub vehicle: Option<VehicleBody>,

    /// Omitted from the open pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerBody>,

    /// Token for the public tracking page, owning dealer only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_token: Option<String>,

    pub accepted_at: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobResponse {
    pub(crate) fn project(job: JobRecord, view: JobView) -> Self {
        let status = job.status();
        let (customer, tracking_token) = match view {
            JobView::Owner => (
                Some(job.customer.into()),
                Some(job.tracking_token.to_string()),
            ),
            JobView::Assignee => (Some(job.customer.into()), None),
            JobView::Pool => (None, None),
        };

        JobResponse {
            uuid: job.uuid.into(),
            dealer_uuid: job.dealer_uuid.into(),
            job_type: job.job_type.into(),
            status: status.into(),
            accepted_at: job.state.accepted_at().as_ref().map(ToString::to_string),
            started_at: job.state.started_at().as_ref().map(ToString::to_string),
            ended_at: job.state.ended_at().as_ref().map(ToString::to_string),
            pickup_address: job.pickup_address,
            delivery_address: job.delivery_address,
            vehicle: job.vehicle.map(Into::into),
            customer,
            tracking_token,
            created_at: job.created_at.to_string(),
            updated_at: job.updated_at.to_string(),
        }
    }

    pub(crate) fn for_session(session: &Session, job: JobRecord) -> Self {
        let view = JobView::for_session(session, &job);

        Self::project(job, view)
    }
}

impl From<JobType> for JobTypeBody {
    fn from(job_type: JobType) -> Self {
        match job_type {
            JobType::Delivery => JobTypeBody::Delivery,
            JobType::Swap => JobTypeBody::Swap,
        }
    }
}

impl From<JobStatus> for JobStatusBody {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Open => JobStatusBody::Open,
            JobStatus::Assigned => JobStatusBody::Assigned,
            JobStatus::InProgress => JobStatusBody::InProgress,
            JobStatus::Completed => JobStatusBody::Completed,
            JobStatus::Cancelled => JobStatusBody::Cancelled,
            JobStatus::Archived => JobStatusBody::Archived,
        }
    }
}

/// A list of jobs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct JobsResponse {
    pub jobs: Vec<JobResponse>,
}
