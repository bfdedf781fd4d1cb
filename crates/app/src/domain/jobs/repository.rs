//! Jobs Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    domain::jobs::{
        data::NewJob,
        records::{Customer, JobRecord, JobState, JobStatus, JobType, JobUuid, Vehicle},
        tracking::TrackingToken,
    },
    session::DealerUuid,
};

const CREATE_JOB_SQL: &str = include_str!("sql/create_job.sql");
const GET_JOB_SQL: &str = include_str!("sql/get_job.sql");
const GET_JOB_BY_TRACKING_TOKEN_SQL: &str = include_str!("sql/get_job_by_tracking_token.sql");
const LIST_DEALER_JOBS_SQL: &str = include_str!("sql/list_dealer_jobs.sql");
const LIST_OPEN_JOBS_SQL: &str = include_str!("sql/list_open_jobs.sql");
const UPDATE_JOB_STATE_SQL: &str = include_str!("sql/update_job_state.sql");
const CLAIM_OPEN_JOB_SQL: &str = include_str!("sql/claim_open_job.sql");
const LIST_ARCHIVABLE_JOBS_SQL: &str = include_str!("sql/list_archivable_jobs.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgJobsRepository;

impl PgJobsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_job(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        dealer: DealerUuid,
        job: NewJob,
        tracking_token: &TrackingToken,
    ) -> Result<JobRecord, sqlx::Error> {
        let vehicle = job.vehicle.unwrap_or_default();

        query_as::<Postgres, JobRecord>(CREATE_JOB_SQL)
            .bind(job.uuid.into_uuid())
            .bind(dealer.into_uuid())
            .bind(job.job_type.as_str())
            .bind(job.pickup_address)
            .bind(job.delivery_address)
            .bind(vehicle.year)
            .bind(vehicle.make)
            .bind(vehicle.model)
            .bind(vehicle.vin)
            .bind(job.customer.name)
            .bind(job.customer.phone)
            .bind(job.customer.email)
            .bind(tracking_token.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_job(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
    ) -> Result<JobRecord, sqlx::Error> {
        query_as::<Postgres, JobRecord>(GET_JOB_SQL)
            .bind(job.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_job(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
    ) -> Result<Option<JobRecord>, sqlx::Error> {
        query_as::<Postgres, JobRecord>(GET_JOB_SQL)
            .bind(job.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_job_by_tracking_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: &TrackingToken,
    ) -> Result<JobRecord, sqlx::Error> {
        query_as::<Postgres, JobRecord>(GET_JOB_BY_TRACKING_TOKEN_SQL)
            .bind(token.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_dealer_jobs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        dealer: DealerUuid,
    ) -> Result<Vec<JobRecord>, sqlx::Error> {
        query_as::<Postgres, JobRecord>(LIST_DEALER_JOBS_SQL)
            .bind(dealer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_open_jobs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<JobRecord>, sqlx::Error> {
        query_as::<Postgres, JobRecord>(LIST_OPEN_JOBS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    /// Write `next` only if the job is still in `expected`.
    ///
    /// Returns `None` when another writer moved the job first.
    pub(crate) async fn update_job_state(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        expected: JobStatus,
        next: JobState,
    ) -> Result<Option<JobRecord>, sqlx::Error> {
        query_as::<Postgres, JobRecord>(UPDATE_JOB_STATE_SQL)
            .bind(job.into_uuid())
            .bind(expected.as_str())
            .bind(next.status().as_str())
            .bind(next.accepted_at().map(SqlxTimestamp::from))
            .bind(next.started_at().map(SqlxTimestamp::from))
            .bind(next.ended_at().map(SqlxTimestamp::from))
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move an open job to `assigned` in one conditional statement.
    ///
    /// Returns `None` when the job is missing or no longer open.
    pub(crate) async fn claim_open_job(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        at: Timestamp,
    ) -> Result<Option<JobRecord>, sqlx::Error> {
        query_as::<Postgres, JobRecord>(CLAIM_OPEN_JOB_SQL)
            .bind(job.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock a dealer's completed jobs that ended before `ended_before`.
    pub(crate) async fn list_archivable_jobs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        dealer: DealerUuid,
        ended_before: Timestamp,
    ) -> Result<Vec<JobRecord>, sqlx::Error> {
        query_as::<Postgres, JobRecord>(LIST_ARCHIVABLE_JOBS_SQL)
            .bind(dealer.into_uuid())
            .bind(SqlxTimestamp::from(ended_before))
            .fetch_all(&mut **tx)
            .await
    }
}

fn decode_error(
    column: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

fn optional_timestamp(row: &PgRow, column: &str) -> sqlx::Result<Option<Timestamp>> {
    Ok(row
        .try_get::<Option<SqlxTimestamp>, _>(column)?
        .map(SqlxTimestamp::to_jiff))
}

impl<'r> FromRow<'r, PgRow> for JobRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let job_type = row
            .try_get::<&str, _>("job_type")?
            .parse::<JobType>()
            .map_err(|error| decode_error("job_type", error))?;

        let status = row
            .try_get::<&str, _>("status")?
            .parse::<JobStatus>()
            .map_err(|error| decode_error("status", error))?;

        let state = JobState::from_columns(
            status,
            optional_timestamp(row, "accepted_at")?,
            optional_timestamp(row, "started_at")?,
            optional_timestamp(row, "ended_at")?,
        )
        .map_err(|error| decode_error("status", error))?;

        let vehicle = Vehicle {
            year: row.try_get("vehicle_year")?,
            make: row.try_get("vehicle_make")?,
            model: row.try_get("vehicle_model")?,
            vin: row.try_get("vehicle_vin")?,
        };

        Ok(Self {
            uuid: JobUuid::from_uuid(row.try_get("uuid")?),
            dealer_uuid: DealerUuid::from_uuid(row.try_get("dealer_uuid")?),
            job_type,
            state,
            pickup_address: row.try_get("pickup_address")?,
            delivery_address: row.try_get("delivery_address")?,
            vehicle: (!vehicle.is_empty()).then_some(vehicle),
            customer: Customer {
                name: row.try_get("customer_name")?,
                phone: row.try_get("customer_phone")?,
                email: row.try_get("customer_email")?,
            },
            tracking_token: TrackingToken::from_stored(row.try_get("tracking_token")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
