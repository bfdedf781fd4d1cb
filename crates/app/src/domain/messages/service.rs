//! Messages service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        assignments::records::AssignmentUuid,
        jobs::records::JobUuid,
        messages::{
            data::NewMessage,
            errors::MessagesServiceError,
            records::{ConversationScope, MessageRecord},
            repository::PgMessagesRepository,
        },
    },
    realtime::{Change, RealtimeHub},
    session::{Actor, Session},
};

#[derive(Debug, Clone)]
pub struct PgMessagesService {
    db: Db,
    repository: PgMessagesRepository,
    realtime: RealtimeHub,
}

impl PgMessagesService {
    #[must_use]
    pub fn new(db: Db, realtime: RealtimeHub) -> Self {
        Self {
            db,
            repository: PgMessagesRepository::new(),
            realtime,
        }
    }

    async fn participant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Actor, MessagesServiceError> {
        self.repository
            .get_conversation(tx, job, assignment)
            .await?
            .participant(session)
            .ok_or(MessagesServiceError::Forbidden)
    }
}

#[async_trait]
impl MessagesService for PgMessagesService {
    #[tracing::instrument(
        name = "messages.service.send_message",
        skip(self, session, message),
        fields(
            job_uuid = %message.job,
            assignment_uuid = %message.assignment,
            kind = %message.kind,
            sender = %session.actor
        ),
        err
    )]
    async fn send_message(
        &self,
        session: &Session,
        message: NewMessage,
    ) -> Result<MessageRecord, MessagesServiceError> {
        let message = message.normalize()?;

        let mut tx = self.db.begin().await?;

        let sender = self
            .participant(&mut tx, session, message.job, message.assignment)
            .await?;

        let record = self
            .repository
            .create_message(&mut tx, sender, message)
            .await?;

        tx.commit().await?;

        info!(message_uuid = %record.uuid, "sent message");

        self.realtime.publish_message(Change::Insert, &record);

        Ok(record)
    }

    #[tracing::instrument(
        name = "messages.service.mark_read",
        skip(self, session),
        fields(job_uuid = %job, assignment_uuid = %assignment, reader = %session.actor),
        err
    )]
    async fn mark_read(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<u64, MessagesServiceError> {
        let mut tx = self.db.begin().await?;

        let reader = self.participant(&mut tx, session, job, assignment).await?;

        let marked = self
            .repository
            .mark_read(&mut tx, job, assignment, reader.role())
            .await?;

        tx.commit().await?;

        for message in &marked {
            self.realtime.publish_message(Change::Update, message);
        }

        u64::try_from(marked.len()).map_err(|_| MessagesServiceError::InvalidData)
    }

    async fn list_messages(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Vec<MessageRecord>, MessagesServiceError> {
        let mut tx = self.db.begin().await?;

        self.participant(&mut tx, session, job, assignment).await?;

        let messages = self.repository.list_messages(&mut tx, job, assignment).await?;

        tx.commit().await?;

        Ok(messages)
    }

    async fn unread_count(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<u64, MessagesServiceError> {
        let mut tx = self.db.begin().await?;

        let reader = self.participant(&mut tx, session, job, assignment).await?;

        let count = self
            .repository
            .count_unread(&mut tx, job, assignment, reader.role())
            .await?;

        tx.commit().await?;

        u64::try_from(count).map_err(|_| MessagesServiceError::InvalidData)
    }

    #[tracing::instrument(
        name = "messages.service.conversation_scope",
        skip(self, session),
        fields(job_uuid = %job, actor = %session.actor),
        err
    )]
    async fn conversation_scope(
        &self,
        session: &Session,
        job: JobUuid,
    ) -> Result<ConversationScope, MessagesServiceError> {
        let mut tx = self.db.begin().await?;

        let dealer = self.repository.get_job_dealer(&mut tx, job).await?;

        if session.is_dealer(dealer) {
            tx.commit().await?;

            return Ok(ConversationScope::whole_job(job));
        }

        let assignments: Vec<AssignmentUuid> = self
            .repository
            .list_conversations(&mut tx, job)
            .await?
            .into_iter()
            .filter(|conversation| conversation.participant(session).is_some())
            .map(|conversation| conversation.assignment_uuid)
            .collect();

        tx.commit().await?;

        if assignments.is_empty() {
            return Err(MessagesServiceError::Forbidden);
        }

        Ok(ConversationScope::assignments(job, assignments))
    }
}

#[automock]
#[async_trait]
/// Per-job conversation operations.
pub trait MessagesService: Send + Sync {
    /// Append a message from the session's participant.
    async fn send_message(
        &self,
        session: &Session,
        message: NewMessage,
    ) -> Result<MessageRecord, MessagesServiceError>;

    /// Mark every message from the other participant as read.
    ///
    /// Returns how many messages were newly marked; repeated calls return 0.
    async fn mark_read(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<u64, MessagesServiceError>;

    /// Conversation history, oldest first.
    async fn list_messages(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Vec<MessageRecord>, MessagesServiceError>;

    /// Unread messages addressed to the session's participant.
    async fn unread_count(
        &self,
        session: &Session,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<u64, MessagesServiceError>;

    /// The conversations on `job` the session takes part in.
    ///
    /// The job's dealer takes part in all of them. Anyone else needs an assignment
    /// on the job, otherwise [`MessagesServiceError::Forbidden`].
    async fn conversation_scope(
        &self,
        session: &Session,
        job: JobUuid,
    ) -> Result<ConversationScope, MessagesServiceError>;
}
