//! Assignment coordinator.
//!
//! Accepting a job is a single conditional update of the job row (`open` to
//! `assigned`) followed by the assignment insert, in one transaction. Concurrent
//! accepts for the same job serialise on the row; exactly one sees the row still
//! open and every other caller gets [`AssignmentsServiceError::AlreadyTaken`].

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        assignments::{
            data::NewAssignment,
            errors::AssignmentsServiceError,
            records::{AssignmentRecord, AssignmentUuid},
            repository::PgAssignmentsRepository,
        },
        jobs::{
            records::{JobState, JobUuid},
            repository::PgJobsRepository,
        },
    },
    realtime::{Change, RealtimeHub},
    session::{Actor, DriverUuid, Session},
};

#[derive(Debug, Clone)]
pub struct PgAssignmentsService {
    db: Db,
    assignments: PgAssignmentsRepository,
    jobs: PgJobsRepository,
    realtime: RealtimeHub,
}

impl PgAssignmentsService {
    #[must_use]
    pub fn new(db: Db, realtime: RealtimeHub) -> Self {
        Self {
            db,
            assignments: PgAssignmentsRepository::new(),
            jobs: PgJobsRepository::new(),
            realtime,
        }
    }
}

#[async_trait]
impl AssignmentsService for PgAssignmentsService {
    #[tracing::instrument(
        name = "assignments.service.accept_job",
        skip(self, session),
        fields(job_uuid = %job, driver_uuid = %driver, outcome = tracing::field::Empty),
        err
    )]
    async fn accept_job(
        &self,
        session: &Session,
        job: JobUuid,
        driver: DriverUuid,
    ) -> Result<AssignmentRecord, AssignmentsServiceError> {
        let span = Span::current();

        if !session.is_driver(driver) {
            span.record("outcome", "rejected");
            return Err(AssignmentsServiceError::Forbidden);
        }

        let mut tx = self.db.begin().await?;

        let Some(claimed) = self
            .jobs
            .claim_open_job(&mut tx, job, Timestamp::now())
            .await?
        else {
            let exists = self.jobs.find_job(&mut tx, job).await?.is_some();

            span.record("outcome", "taken");

            return Err(if exists {
                AssignmentsServiceError::AlreadyTaken
            } else {
                AssignmentsServiceError::NotFound
            });
        };

        let JobState::Assigned { accepted_at } = claimed.state else {
            return Err(AssignmentsServiceError::InvalidData);
        };

        let assignment = self
            .assignments
            .create_assignment(
                &mut tx,
                NewAssignment {
                    uuid: AssignmentUuid::new(),
                    job,
                    driver,
                    accepted_at,
                },
            )
            .await?;

        tx.commit().await?;

        span.record("outcome", "won");

        info!(
            job_uuid = %job,
            driver_uuid = %driver,
            assignment_uuid = %assignment.uuid,
            "accepted job"
        );

        self.realtime.publish_job(Change::Update, &claimed);

        Ok(assignment)
    }

    async fn active_assignment(
        &self,
        session: &Session,
        job: JobUuid,
    ) -> Result<Option<AssignmentRecord>, AssignmentsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.jobs.get_job(&mut tx, job).await?;

        let visible = match session.actor {
            Actor::Dealer(dealer) => record.dealer_uuid == dealer,
            Actor::Driver(_) if record.is_open() => true,
            Actor::Driver(driver) => self
                .assignments
                .find_driver_assignment(&mut tx, job, driver)
                .await?
                .is_some(),
        };

        if !visible {
            return Err(AssignmentsServiceError::Forbidden);
        }

        let active = self.assignments.find_active_assignment(&mut tx, job).await?;

        tx.commit().await?;

        Ok(active)
    }
}

#[automock]
#[async_trait]
/// Driver assignment operations.
pub trait AssignmentsService: Send + Sync {
    /// Atomically claim an open job for `driver`.
    ///
    /// Fails with [`AssignmentsServiceError::AlreadyTaken`] when any other accept won.
    async fn accept_job(
        &self,
        session: &Session,
        job: JobUuid,
        driver: DriverUuid,
    ) -> Result<AssignmentRecord, AssignmentsServiceError>;

    /// The job's assignment that has not ended, if any.
    async fn active_assignment(
        &self,
        session: &Session,
        job: JobUuid,
    ) -> Result<Option<AssignmentRecord>, AssignmentsServiceError>;
}
