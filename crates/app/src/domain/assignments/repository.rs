//! Assignments Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    domain::{
        assignments::{
            data::NewAssignment,
            records::{AssignmentRecord, AssignmentUuid},
        },
        jobs::records::JobUuid,
    },
    session::DriverUuid,
};

const CREATE_ASSIGNMENT_SQL: &str = include_str!("sql/create_assignment.sql");
const FIND_ACTIVE_ASSIGNMENT_SQL: &str = include_str!("sql/find_active_assignment.sql");
const FIND_DRIVER_ASSIGNMENT_SQL: &str = include_str!("sql/find_driver_assignment.sql");
const GET_ASSIGNMENT_SQL: &str = include_str!("sql/get_assignment.sql");
const START_ACTIVE_ASSIGNMENT_SQL: &str = include_str!("sql/start_active_assignment.sql");
const END_ACTIVE_ASSIGNMENT_SQL: &str = include_str!("sql/end_active_assignment.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAssignmentsRepository;

impl PgAssignmentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        assignment: NewAssignment,
    ) -> Result<AssignmentRecord, sqlx::Error> {
        query_as::<Postgres, AssignmentRecord>(CREATE_ASSIGNMENT_SQL)
            .bind(assignment.uuid.into_uuid())
            .bind(assignment.job.into_uuid())
            .bind(assignment.driver.into_uuid())
            .bind(SqlxTimestamp::from(assignment.accepted_at))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
    ) -> Result<Option<AssignmentRecord>, sqlx::Error> {
        query_as::<Postgres, AssignmentRecord>(FIND_ACTIVE_ASSIGNMENT_SQL)
            .bind(job.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Most recent assignment of `driver` to `job`, active or not.
    pub(crate) async fn find_driver_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        driver: DriverUuid,
    ) -> Result<Option<AssignmentRecord>, sqlx::Error> {
        query_as::<Postgres, AssignmentRecord>(FIND_DRIVER_ASSIGNMENT_SQL)
            .bind(job.into_uuid())
            .bind(driver.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<AssignmentRecord, sqlx::Error> {
        query_as::<Postgres, AssignmentRecord>(GET_ASSIGNMENT_SQL)
            .bind(job.into_uuid())
            .bind(assignment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn start_active_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        at: Timestamp,
    ) -> Result<Option<AssignmentRecord>, sqlx::Error> {
        query_as::<Postgres, AssignmentRecord>(START_ACTIVE_ASSIGNMENT_SQL)
            .bind(job.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn end_active_assignment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        at: Timestamp,
    ) -> Result<Option<AssignmentRecord>, sqlx::Error> {
        query_as::<Postgres, AssignmentRecord>(END_ACTIVE_ASSIGNMENT_SQL)
            .bind(job.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for AssignmentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AssignmentUuid::from_uuid(row.try_get("uuid")?),
            job_uuid: JobUuid::from_uuid(row.try_get("job_uuid")?),
            driver_uuid: DriverUuid::from_uuid(row.try_get("driver_uuid")?),
            accepted_at: row.try_get::<SqlxTimestamp, _>("accepted_at")?.to_jiff(),
            started_at: row
                .try_get::<Option<SqlxTimestamp>, _>("started_at")?
                .map(SqlxTimestamp::to_jiff),
            ended_at: row
                .try_get::<Option<SqlxTimestamp>, _>("ended_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
