//! Notifications Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query_scalar};

use crate::session::DriverUuid;

const COUNT_UNSEEN_JOBS_SQL: &str = include_str!("sql/count_unseen_jobs.sql");
const ADVANCE_CHECKPOINT_SQL: &str = include_str!("sql/advance_checkpoint.sql");
const GET_CHECKPOINT_SQL: &str = include_str!("sql/get_checkpoint.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgNotificationsRepository;

impl PgNotificationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn count_unseen_jobs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        driver: DriverUuid,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_UNSEEN_JOBS_SQL)
            .bind(driver.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Move the checkpoint to the database clock, never backwards.
    pub(crate) async fn advance_checkpoint(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        driver: DriverUuid,
    ) -> Result<Timestamp, sqlx::Error> {
        query_scalar::<Postgres, SqlxTimestamp>(ADVANCE_CHECKPOINT_SQL)
            .bind(driver.into_uuid())
            .fetch_one(&mut **tx)
            .await
            .map(SqlxTimestamp::to_jiff)
    }

    pub(crate) async fn get_checkpoint(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        driver: DriverUuid,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        Ok(query_scalar::<Postgres, SqlxTimestamp>(GET_CHECKPOINT_SQL)
            .bind(driver.into_uuid())
            .fetch_optional(&mut **tx)
            .await?
            .map(SqlxTimestamp::to_jiff))
    }
}
