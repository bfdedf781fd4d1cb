//! Presence service.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        assignments::records::AssignmentUuid,
        jobs::records::JobUuid,
        messages::repository::PgMessagesRepository,
        presence::{errors::PresenceServiceError, store::PresenceStore},
    },
    realtime::{RealtimeHub, TypingSignal},
    session::{Actor, Session},
};

#[derive(Debug, Clone)]
pub struct PgPresenceService {
    db: Db,
    conversations: PgMessagesRepository,
    store: Arc<PresenceStore>,
    realtime: RealtimeHub,
}

impl PgPresenceService {
    #[must_use]
    pub fn new(db: Db, store: Arc<PresenceStore>, realtime: RealtimeHub) -> Self {
        Self {
            db,
            conversations: PgMessagesRepository::new(),
            store,
            realtime,
        }
    }

    async fn participant(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Actor, PresenceServiceError> {
        let mut tx = self.db.begin().await?;

        let conversation = self
            .conversations
            .get_conversation(&mut tx, job, assignment)
            .await?;

        tx.commit().await?;

        conversation
            .participant(session)
            .ok_or(PresenceServiceError::Forbidden)
    }
}

#[async_trait]
impl PresenceService for PgPresenceService {
    async fn set_typing(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
        typing: bool,
    ) -> Result<(), PresenceServiceError> {
        let actor = self.participant(session, job, assignment).await?;
        let now = Instant::now();

        let changed = if typing {
            self.store.start(job, assignment, actor, now)
        } else {
            self.store.stop(job, actor, now)
        };

        if changed {
            self.realtime.publish_typing(TypingSignal {
                job,
                assignment,
                actor,
                typing,
            });
        }

        Ok(())
    }

    async fn typing_participants(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Vec<Actor>, PresenceServiceError> {
        self.participant(session, job, assignment).await?;

        Ok(self.store.typing(job, assignment, Instant::now()))
    }

    fn sweep_expired(&self) -> usize {
        let expired = self.store.prune(Instant::now());

        for entry in &expired {
            self.realtime.publish_typing(TypingSignal {
                job: entry.job,
                assignment: entry.assignment,
                actor: entry.actor,
                typing: false,
            });
        }

        if !expired.is_empty() {
            debug!(expired = expired.len(), "swept lapsed typing signals");
        }

        expired.len()
    }
}

#[automock]
#[async_trait]
/// Ephemeral typing presence.
pub trait PresenceService: Send + Sync {
    /// Start or stop the session participant's typing signal.
    ///
    /// Subscribers only hear about changes; refreshing an active signal extends its
    /// lifetime silently.
    async fn set_typing(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
        typing: bool,
    ) -> Result<(), PresenceServiceError>;

    /// Participants currently typing in the conversation.
    async fn typing_participants(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Vec<Actor>, PresenceServiceError>;

    /// Drop lapsed signals and announce them as stopped.
    fn sweep_expired(&self) -> usize;
}
