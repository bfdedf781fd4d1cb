//! Jobs service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        assignments::repository::PgAssignmentsRepository,
        jobs::{
            data::NewJob,
            errors::JobsServiceError,
            records::{JobRecord, JobStatus, JobUuid},
            repository::PgJobsRepository,
            state::InvalidTransition,
            tracking::TrackingToken,
        },
    },
    realtime::{Change, RealtimeHub},
    session::{Actor, Session},
};

#[derive(Debug, Clone)]
pub struct PgJobsService {
    db: Db,
    jobs: PgJobsRepository,
    assignments: PgAssignmentsRepository,
    realtime: RealtimeHub,
}

impl PgJobsService {
    #[must_use]
    pub fn new(db: Db, realtime: RealtimeHub) -> Self {
        Self {
            db,
            jobs: PgJobsRepository::new(),
            assignments: PgAssignmentsRepository::new(),
            realtime,
        }
    }
}

#[async_trait]
impl JobsService for PgJobsService {
    #[tracing::instrument(
        name = "jobs.service.create_job",
        skip(self, session, job),
        fields(job_uuid = %job.uuid, dealer_uuid = tracing::field::Empty),
        err
    )]
    async fn create_job(&self, session: &Session, job: NewJob) -> Result<JobRecord, JobsServiceError> {
        let dealer = session.as_dealer().ok_or(JobsServiceError::Forbidden)?;

        Span::current().record("dealer_uuid", tracing::field::display(dealer));

        job.validate()?;
        let tracking_token = TrackingToken::generate();

        let mut tx = self.db.begin().await?;

        let record = self
            .jobs
            .create_job(&mut tx, dealer, job, &tracking_token)
            .await?;

        tx.commit().await?;

        info!(job_uuid = %record.uuid, "created job");

        self.realtime.publish_job(Change::Insert, &record);

        Ok(record)
    }

    async fn list_dealer_jobs(&self, session: &Session) -> Result<Vec<JobRecord>, JobsServiceError> {
        let dealer = session.as_dealer().ok_or(JobsServiceError::Forbidden)?;

        let mut tx = self.db.begin().await?;

        let jobs = self.jobs.list_dealer_jobs(&mut tx, dealer).await?;

        tx.commit().await?;

        Ok(jobs)
    }

    async fn list_open_jobs(&self, session: &Session) -> Result<Vec<JobRecord>, JobsServiceError> {
        if session.as_driver().is_none() {
            return Err(JobsServiceError::Forbidden);
        }

        let mut tx = self.db.begin().await?;

        let jobs = self.jobs.list_open_jobs(&mut tx).await?;

        tx.commit().await?;

        Ok(jobs)
    }

    async fn get_job(&self, session: &Session, job: JobUuid) -> Result<JobRecord, JobsServiceError> {
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

        tx.commit().await?;

        if !visible {
            return Err(JobsServiceError::Forbidden);
        }

        Ok(record)
    }

    #[tracing::instrument(
        name = "jobs.service.advance_status",
        skip(self, session),
        fields(job_uuid = %job, target = %target, actor = %session.actor),
        err
    )]
    async fn advance_status(
        &self,
        session: &Session,
        job: JobUuid,
        target: JobStatus,
    ) -> Result<JobRecord, JobsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.jobs.get_job(&mut tx, job).await?;

        let involved = match session.actor {
            Actor::Dealer(dealer) => dealer == current.dealer_uuid,
            Actor::Driver(driver) => self
                .assignments
                .find_driver_assignment(&mut tx, job, driver)
                .await?
                .is_some(),
        };

        if !involved {
            return Err(JobsServiceError::Forbidden);
        }

        // Illegal edges are reported before who may take them.
        let next = match target {
            // Reachable only through accepting the job.
            JobStatus::Open | JobStatus::Assigned => Err(InvalidTransition {
                from: current.status(),
                to: target,
            }),
            _ => current.next_state(target, Timestamp::now()),
        }?;

        let authorized = match target {
            JobStatus::InProgress | JobStatus::Completed => match session.as_driver() {
                Some(driver) => self
                    .assignments
                    .find_active_assignment(&mut tx, job)
                    .await?
                    .is_some_and(|assignment| assignment.driver_uuid == driver),
                None => false,
            },
            JobStatus::Cancelled | JobStatus::Archived => session.is_dealer(current.dealer_uuid),
            JobStatus::Open | JobStatus::Assigned => false,
        };

        if !authorized {
            return Err(JobsServiceError::Forbidden);
        }

        let Some(updated) = self
            .jobs
            .update_job_state(&mut tx, job, current.status(), next)
            .await?
        else {
            // Lost a race with another writer; report against the status it moved to.
            let latest = self.jobs.get_job(&mut tx, job).await?;

            return Err(InvalidTransition {
                from: latest.status(),
                to: target,
            }
            .into());
        };

        match next.status() {
            JobStatus::InProgress => {
                if let Some(started_at) = next.started_at() {
                    self.assignments
                        .start_active_assignment(&mut tx, job, started_at)
                        .await?;
                }
            }
            JobStatus::Completed | JobStatus::Cancelled => {
                if let Some(ended_at) = next.ended_at() {
                    self.assignments
                        .end_active_assignment(&mut tx, job, ended_at)
                        .await?;
                }
            }
            JobStatus::Open | JobStatus::Assigned | JobStatus::Archived => {}
        }

        tx.commit().await?;

        info!(
            job_uuid = %job,
            from = %current.status(),
            to = %updated.status(),
            "advanced job status"
        );

        self.realtime.publish_job(Change::Update, &updated);

        Ok(updated)
    }

    async fn get_job_by_tracking_token(
        &self,
        token: &TrackingToken,
    ) -> Result<JobRecord, JobsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.jobs.get_job_by_tracking_token(&mut tx, token).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "jobs.service.archive_completed",
        skip(self, session),
        fields(ended_before = %ended_before, archived = tracing::field::Empty),
        err
    )]
    async fn archive_completed(
        &self,
        session: &Session,
        ended_before: Timestamp,
    ) -> Result<Vec<JobRecord>, JobsServiceError> {
        let dealer = session.as_dealer().ok_or(JobsServiceError::Forbidden)?;
        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        let candidates = self
            .jobs
            .list_archivable_jobs(&mut tx, dealer, ended_before)
            .await?;

        let mut archived = Vec::with_capacity(candidates.len());

        for job in candidates {
            let next = job.next_state(JobStatus::Archived, now)?;

            if let Some(updated) = self
                .jobs
                .update_job_state(&mut tx, job.uuid, job.status(), next)
                .await?
            {
                archived.push(updated);
            }
        }

        tx.commit().await?;

        Span::current().record("archived", archived.len());

        for job in &archived {
            self.realtime.publish_job(Change::Update, job);
        }

        Ok(archived)
    }
}

#[automock]
#[async_trait]
/// Job lifecycle operations.
pub trait JobsService: Send + Sync {
    /// Create an open job owned by the session's dealer.
    async fn create_job(&self, session: &Session, job: NewJob) -> Result<JobRecord, JobsServiceError>;

    /// Jobs owned by the session's dealer, newest first.
    async fn list_dealer_jobs(&self, session: &Session) -> Result<Vec<JobRecord>, JobsServiceError>;

    /// Open jobs visible to drivers, newest first.
    async fn list_open_jobs(&self, session: &Session) -> Result<Vec<JobRecord>, JobsServiceError>;

    /// A single job, if the session may see it.
    async fn get_job(&self, session: &Session, job: JobUuid) -> Result<JobRecord, JobsServiceError>;

    /// Move a job along its lifecycle.
    async fn advance_status(
        &self,
        session: &Session,
        job: JobUuid,
        target: JobStatus,
    ) -> Result<JobRecord, JobsServiceError>;

    /// Public lookup used by customer tracking pages.
    async fn get_job_by_tracking_token(
        &self,
        token: &TrackingToken,
    ) -> Result<JobRecord, JobsServiceError>;

    /// Archive the session dealer's jobs that completed before `ended_before`.
    async fn archive_completed(
        &self,
        session: &Session,
        ended_before: Timestamp,
    ) -> Result<Vec<JobRecord>, JobsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use crate::{
        domain::{
            assignments::AssignmentsService,
            jobs::{
                data::JobValidationError,
                records::{JobState, Vehicle},
            },
        },
        realtime::{ChannelKey, RealtimeEvent},
        session::{DealerUuid, DriverUuid},
        test::{
            TestContext,
            helpers::{create_job, driver_session, new_job},
        },
    };

    use super::*;

    #[tokio::test]
    async fn create_job_starts_open_with_tracking_token() -> TestResult {
        let ctx = TestContext::new().await;

        let job = create_job(&ctx, &ctx.dealer).await?;

        assert_eq!(job.state, JobState::Open);
        assert_eq!(Some(job.dealer_uuid), ctx.dealer.as_dealer());
        assert!(TrackingToken::parse(job.tracking_token.as_str()).is_some());
        assert!(job.vehicle.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn create_job_rejects_driver_sessions() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.jobs.create_job(&driver_session(), new_job()).await;

        assert!(
            matches!(result, Err(JobsServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_job_rejects_invalid_input() -> TestResult {
        let ctx = TestContext::new().await;

        let mut job = new_job();
        job.customer.name = "  ".to_string();

        let result = ctx.jobs.create_job(&ctx.dealer, job).await;

        assert!(
            matches!(
                result,
                Err(JobsServiceError::Validation(JobValidationError::MissingCustomerName))
            ),
            "expected MissingCustomerName, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_job_publishes_to_dealer_and_open_pool() -> TestResult {
        let ctx = TestContext::new().await;
        let dealer = ctx.dealer.as_dealer().ok_or("dealer session")?;

        let mut dealer_feed = ctx.realtime.subscribe(ChannelKey::DealerJobs(dealer));
        let mut open_feed = ctx.realtime.subscribe(ChannelKey::OpenJobs);

        let job = create_job(&ctx, &ctx.dealer).await?;

        for feed in [&mut dealer_feed, &mut open_feed] {
            let event = feed.try_recv()?.ok_or("expected an event")?;

            assert!(
                matches!(&event, RealtimeEvent::Job { change: Change::Insert, job: published } if published.uuid == job.uuid),
                "unexpected event {event:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn list_open_jobs_is_newest_first_and_excludes_taken() -> TestResult {
        let ctx = TestContext::new().await;
        let driver = driver_session();

        let first = create_job(&ctx, &ctx.dealer).await?;
        let second = create_job(&ctx, &ctx.dealer).await?;
        let third = create_job(&ctx, &ctx.dealer).await?;

        let driver_uuid = driver.as_driver().ok_or("driver session")?;
        ctx.assignments
            .accept_job(&driver, second.uuid, driver_uuid)
            .await?;

        let open: Vec<JobUuid> = ctx
            .jobs
            .list_open_jobs(&driver)
            .await?
            .into_iter()
            .map(|job| job.uuid)
            .collect();

        assert_eq!(open, vec![third.uuid, first.uuid]);

        Ok(())
    }

    #[tokio::test]
    async fn list_dealer_jobs_only_returns_own_jobs() -> TestResult {
        let ctx = TestContext::new().await;
        let other_dealer = Session::dealer(DealerUuid::new());

        let mine = create_job(&ctx, &ctx.dealer).await?;
        create_job(&ctx, &other_dealer).await?;

        let jobs = ctx.jobs.list_dealer_jobs(&ctx.dealer).await?;

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs.first().map(|job| job.uuid), Some(mine.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn get_job_hides_assigned_jobs_from_other_drivers() -> TestResult {
        let ctx = TestContext::new().await;
        let winner = driver_session();
        let bystander = driver_session();

        let job = create_job(&ctx, &ctx.dealer).await?;

        ctx.jobs.get_job(&bystander, job.uuid).await?;

        ctx.assignments
            .accept_job(&winner, job.uuid, winner.as_driver().ok_or("driver")?)
            .await?;

        ctx.jobs.get_job(&winner, job.uuid).await?;

        let result = ctx.jobs.get_job(&bystander, job.uuid).await;

        assert!(
            matches!(result, Err(JobsServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_job_returns_not_found_for_unknown_job() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.jobs.get_job(&ctx.dealer, JobUuid::new()).await;

        assert!(
            matches!(result, Err(JobsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn full_lifecycle_records_monotonic_timestamps() -> TestResult {
        let ctx = TestContext::new().await;
        let driver = driver_session();
        let driver_uuid = driver.as_driver().ok_or("driver")?;

        let job = create_job(&ctx, &ctx.dealer).await?;

        let assignment = ctx
            .assignments
            .accept_job(&driver, job.uuid, driver_uuid)
            .await?;

        let started = ctx
            .jobs
            .advance_status(&driver, job.uuid, JobStatus::InProgress)
            .await?;
        let completed = ctx
            .jobs
            .advance_status(&driver, job.uuid, JobStatus::Completed)
            .await?;
        let archived = ctx
            .jobs
            .advance_status(&ctx.dealer, job.uuid, JobStatus::Archived)
            .await?;

        let accepted_at = started.state.accepted_at().ok_or("accepted_at")?;
        let started_at = completed.state.started_at().ok_or("started_at")?;
        let ended_at = completed.state.ended_at().ok_or("ended_at")?;

        assert_eq!(accepted_at, assignment.accepted_at);
        assert!(job.created_at <= accepted_at);
        assert!(accepted_at <= started_at);
        assert!(started_at <= ended_at);
        assert_eq!(archived.status(), JobStatus::Archived);
        assert_eq!(archived.state.ended_at(), Some(ended_at));

        let active = ctx.assignments.active_assignment(&driver, job.uuid).await?;

        assert_eq!(active, None, "completing a job ends its assignment");

        Ok(())
    }

    #[tokio::test]
    async fn advance_status_rejects_skipping_states() -> TestResult {
        let ctx = TestContext::new().await;
        let driver = driver_session();

        let job = create_job(&ctx, &ctx.dealer).await?;

        ctx.assignments
            .accept_job(&driver, job.uuid, driver.as_driver().ok_or("driver")?)
            .await?;

        let result = ctx
            .jobs
            .advance_status(&driver, job.uuid, JobStatus::Completed)
            .await;

        assert!(
            matches!(
                result,
                Err(JobsServiceError::InvalidTransition(InvalidTransition {
                    from: JobStatus::Assigned,
                    to: JobStatus::Completed
                }))
            ),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn retrying_a_finished_job_reports_the_transition() -> TestResult {
        let ctx = TestContext::new().await;
        let driver = driver_session();

        let job = create_job(&ctx, &ctx.dealer).await?;

        ctx.assignments
            .accept_job(&driver, job.uuid, driver.as_driver().ok_or("driver")?)
            .await?;
        ctx.jobs
            .advance_status(&driver, job.uuid, JobStatus::InProgress)
            .await?;
        ctx.jobs
            .advance_status(&driver, job.uuid, JobStatus::Completed)
            .await?;

        for target in [JobStatus::InProgress, JobStatus::Completed] {
            let result = ctx.jobs.advance_status(&driver, job.uuid, target).await;

            assert!(
                matches!(
                    result,
                    Err(JobsServiceError::InvalidTransition(InvalidTransition {
                        from: JobStatus::Completed,
                        ..
                    }))
                ),
                "expected InvalidTransition, got {result:?}"
            );
        }

        let bystander = ctx
            .jobs
            .advance_status(&driver_session(), job.uuid, JobStatus::Completed)
            .await;

        assert!(
            matches!(bystander, Err(JobsServiceError::Forbidden)),
            "expected Forbidden, got {bystander:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn advance_status_never_assigns_directly() -> TestResult {
        let ctx = TestContext::new().await;

        let job = create_job(&ctx, &ctx.dealer).await?;

        let result = ctx
            .jobs
            .advance_status(&ctx.dealer, job.uuid, JobStatus::Assigned)
            .await;

        assert!(
            matches!(result, Err(JobsServiceError::InvalidTransition(_))),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn only_the_assigned_driver_may_start_the_job() -> TestResult {
        let ctx = TestContext::new().await;
        let driver = driver_session();
        let other = driver_session();

        let job = create_job(&ctx, &ctx.dealer).await?;

        ctx.assignments
            .accept_job(&driver, job.uuid, driver.as_driver().ok_or("driver")?)
            .await?;

        for session in [&other, &ctx.dealer] {
            let result = ctx
                .jobs
                .advance_status(session, job.uuid, JobStatus::InProgress)
                .await;

            assert!(
                matches!(result, Err(JobsServiceError::Forbidden)),
                "expected Forbidden, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn cancelling_an_assigned_job_ends_the_assignment() -> TestResult {
        let ctx = TestContext::new().await;
        let driver = driver_session();

        let job = create_job(&ctx, &ctx.dealer).await?;

        let assignment = ctx
            .assignments
            .accept_job(&driver, job.uuid, driver.as_driver().ok_or("driver")?)
            .await?;

        let cancelled = ctx
            .jobs
            .advance_status(&ctx.dealer, job.uuid, JobStatus::Cancelled)
            .await?;

        assert_eq!(cancelled.state.accepted_at(), Some(assignment.accepted_at));
        assert!(cancelled.state.ended_at().is_some());
        assert_eq!(
            ctx.assignments.active_assignment(&ctx.dealer, job.uuid).await?,
            None
        );

        Ok(())
    }

    #[tokio::test]
    async fn terminal_jobs_cannot_be_reopened_or_restarted() -> TestResult {
        let ctx = TestContext::new().await;

        let job = create_job(&ctx, &ctx.dealer).await?;

        ctx.jobs
            .advance_status(&ctx.dealer, job.uuid, JobStatus::Cancelled)
            .await?;

        let result = ctx
            .jobs
            .advance_status(&ctx.dealer, job.uuid, JobStatus::Cancelled)
            .await;

        assert!(
            matches!(
                result,
                Err(JobsServiceError::InvalidTransition(InvalidTransition {
                    from: JobStatus::Cancelled,
                    to: JobStatus::Cancelled
                }))
            ),
            "expected InvalidTransition, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn tracking_token_lookup_returns_the_job() -> TestResult {
        let ctx = TestContext::new().await;

        let mut supplied = new_job();
        supplied.pickup_address = " 12 Depot Road, Leeds ".to_string();
        supplied.vehicle = Some(Vehicle {
            year: Some(2019),
            make: Some("Volvo".to_string()),
            model: Some("XC40 Recharge".to_string()),
            vin: Some("yv1xzacv3l2345678".to_string()),
        });

        let job = ctx.jobs.create_job(&ctx.dealer, supplied.clone()).await?;

        let tracked = ctx
            .jobs
            .get_job_by_tracking_token(&job.tracking_token)
            .await?;

        assert_eq!(tracked.uuid, supplied.uuid);
        assert_eq!(tracked.job_type, supplied.job_type);
        assert_eq!(tracked.pickup_address, supplied.pickup_address);
        assert_eq!(tracked.delivery_address, supplied.delivery_address);
        assert_eq!(tracked.vehicle, supplied.vehicle);
        assert_eq!(tracked.customer, supplied.customer);

        let unknown = ctx
            .jobs
            .get_job_by_tracking_token(&TrackingToken::generate())
            .await;

        assert!(
            matches!(unknown, Err(JobsServiceError::NotFound)),
            "expected NotFound, got {unknown:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn archive_completed_only_touches_old_completed_jobs() -> TestResult {
        let ctx = TestContext::new().await;
        let driver = driver_session();
        let driver_uuid: DriverUuid = driver.as_driver().ok_or("driver")?;

        let completed = create_job(&ctx, &ctx.dealer).await?;
        let still_open = create_job(&ctx, &ctx.dealer).await?;

        ctx.assignments
            .accept_job(&driver, completed.uuid, driver_uuid)
            .await?;
        ctx.jobs
            .advance_status(&driver, completed.uuid, JobStatus::InProgress)
            .await?;
        ctx.jobs
            .advance_status(&driver, completed.uuid, JobStatus::Completed)
            .await?;

        let cutoff = Timestamp::now() + SignedDuration::from_secs(60);

        let archived = ctx.jobs.archive_completed(&ctx.dealer, cutoff).await?;

        assert_eq!(archived.len(), 1);
        assert_eq!(archived.first().map(|job| job.uuid), Some(completed.uuid));
        assert_eq!(
            ctx.jobs.get_job(&ctx.dealer, still_open.uuid).await?.status(),
            JobStatus::Open
        );

        let again = ctx.jobs.archive_completed(&ctx.dealer, cutoff).await?;

        assert!(again.is_empty());

        Ok(())
    }
}
