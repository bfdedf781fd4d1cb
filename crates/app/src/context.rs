//! App Context

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        assignments::{AssignmentsService, PgAssignmentsService},
        jobs::{JobsService, PgJobsService},
        messages::{MessagesService, PgMessagesService},
        notifications::{NotificationsService, PgNotificationsService},
        presence::{PgPresenceService, PresenceService, PresenceStore, store::DEFAULT_TYPING_TTL},
        sessions::{PgSessionsService, SessionsService},
    },
    realtime::{DEFAULT_CHANNEL_CAPACITY, RealtimeHub},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

/// Tunables for the in-process realtime layer.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeSettings {
    /// Events buffered per channel before slow subscribers start lagging.
    pub channel_capacity: usize,

    /// How long a typing signal lives without being refreshed.
    pub typing_ttl: Duration,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            typing_ttl: DEFAULT_TYPING_TTL,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub jobs: Arc<dyn JobsService>,
    pub assignments: Arc<dyn AssignmentsService>,
    pub messages: Arc<dyn MessagesService>,
    pub presence: Arc<dyn PresenceService>,
    pub notifications: Arc<dyn NotificationsService>,
    pub sessions: Arc<dyn SessionsService>,
    pub realtime: RealtimeHub,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails, or when
    /// `migrate` is set and the schema cannot be brought up to date.
    pub async fn from_database_url(
        url: &str,
        migrate: bool,
        settings: RealtimeSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if migrate {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        Ok(Self::new(Db::new(pool), settings))
    }

    #[must_use]
    pub fn new(db: Db, settings: RealtimeSettings) -> Self {
        let realtime = RealtimeHub::new(settings.channel_capacity);
        let store = Arc::new(PresenceStore::new(settings.typing_ttl));

        Self {
            jobs: Arc::new(PgJobsService::new(db.clone(), realtime.clone())),
            assignments: Arc::new(PgAssignmentsService::new(db.clone(), realtime.clone())),
            messages: Arc::new(PgMessagesService::new(db.clone(), realtime.clone())),
            presence: Arc::new(PgPresenceService::new(db.clone(), store, realtime.clone())),
            notifications: Arc::new(PgNotificationsService::new(db.clone())),
            sessions: Arc::new(PgSessionsService::new(db)),
            realtime,
        }
    }
}
