//! Notifications service.
//!
//! Each driver has a "last seen" checkpoint; open jobs created after it count as
//! unseen. The count is derived on demand and never stored.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::notifications::{
        errors::NotificationsServiceError, repository::PgNotificationsRepository,
    },
    session::{DriverUuid, Session},
};

#[derive(Debug, Clone)]
pub struct PgNotificationsService {
    db: Db,
    repository: PgNotificationsRepository,
}

impl PgNotificationsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgNotificationsRepository::new(),
        }
    }
}

fn authorize(session: &Session, driver: DriverUuid) -> Result<(), NotificationsServiceError> {
    if session.is_driver(driver) {
        Ok(())
    } else {
        Err(NotificationsServiceError::Forbidden)
    }
}

#[async_trait]
impl NotificationsService for PgNotificationsService {
    async fn fetch_unseen_count(
        &self,
        session: &Session,
        driver: DriverUuid,
    ) -> Result<u64, NotificationsServiceError> {
        authorize(session, driver)?;

        let mut tx = self.db.begin().await?;

        let count = self.repository.count_unseen_jobs(&mut tx, driver).await?;

        tx.commit().await?;

        u64::try_from(count).map_err(|_| NotificationsServiceError::InvalidData)
    }

    async fn mark_seen(
        &self,
        session: &Session,
        driver: DriverUuid,
    ) -> Result<Timestamp, NotificationsServiceError> {
        authorize(session, driver)?;

        let mut tx = self.db.begin().await?;

        let checkpoint = self.repository.advance_checkpoint(&mut tx, driver).await?;

        tx.commit().await?;

        Ok(checkpoint)
    }

    async fn last_seen(
        &self,
        session: &Session,
        driver: DriverUuid,
    ) -> Result<Option<Timestamp>, NotificationsServiceError> {
        authorize(session, driver)?;

        let mut tx = self.db.begin().await?;

        let checkpoint = self.repository.get_checkpoint(&mut tx, driver).await?;

        tx.commit().await?;

        Ok(checkpoint)
    }
}

#[automock]
#[async_trait]
/// Unseen-job notification checkpoints.
pub trait NotificationsService: Send + Sync {
    /// Open jobs created since the driver's checkpoint.
    async fn fetch_unseen_count(
        &self,
        session: &Session,
        driver: DriverUuid,
    ) -> Result<u64, NotificationsServiceError>;

    /// Advance the driver's checkpoint to now and return it.
    async fn mark_seen(
        &self,
        session: &Session,
        driver: DriverUuid,
    ) -> Result<Timestamp, NotificationsServiceError>;

    /// The driver's checkpoint, if one was ever recorded.
    async fn last_seen(
        &self,
        session: &Session,
        driver: DriverUuid,
    ) -> Result<Option<Timestamp>, NotificationsServiceError>;
}
