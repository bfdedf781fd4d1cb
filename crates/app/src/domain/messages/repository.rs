//! Messages Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    domain::{
        assignments::records::AssignmentUuid,
        jobs::records::JobUuid,
        messages::{
            data::NewMessage,
            records::{Conversation, MessageKind, MessageRecord, MessageUuid},
        },
    },
    session::{Actor, DealerUuid, DriverUuid, Role},
};

const CREATE_MESSAGE_SQL: &str = include_str!("sql/create_message.sql");
const LIST_MESSAGES_SQL: &str = include_str!("sql/list_messages.sql");
const MARK_READ_SQL: &str = include_str!("sql/mark_read.sql");
const COUNT_UNREAD_SQL: &str = include_str!("sql/count_unread.sql");
const GET_CONVERSATION_SQL: &str = include_str!("sql/get_conversation.sql");
const LIST_CONVERSATIONS_SQL: &str = include_str!("sql/list_conversations.sql");
const GET_JOB_DEALER_SQL: &str = include_str!("sql/get_job_dealer.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgMessagesRepository;

impl PgMessagesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_conversation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Conversation, sqlx::Error> {
        query_as::<Postgres, Conversation>(GET_CONVERSATION_SQL)
            .bind(job.into_uuid())
            .bind(assignment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_conversations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        query_as::<Postgres, Conversation>(LIST_CONVERSATIONS_SQL)
            .bind(job.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_job_dealer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
    ) -> Result<DealerUuid, sqlx::Error> {
        query_scalar::<Postgres, uuid::Uuid>(GET_JOB_DEALER_SQL)
            .bind(job.into_uuid())
            .fetch_one(&mut **tx)
            .await
            .map(DealerUuid::from_uuid)
    }

    pub(crate) async fn create_message(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sender: Actor,
        message: NewMessage,
    ) -> Result<MessageRecord, sqlx::Error> {
        query_as::<Postgres, MessageRecord>(CREATE_MESSAGE_SQL)
            .bind(message.uuid.into_uuid())
            .bind(message.job.into_uuid())
            .bind(message.assignment.into_uuid())
            .bind(sender.role().as_str())
            .bind(sender.uuid())
            .bind(message.kind.as_str())
            .bind(message.body)
            .bind(message.attachment_ref)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_messages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        assignment: AssignmentUuid,
    ) -> Result<Vec<MessageRecord>, sqlx::Error> {
        query_as::<Postgres, MessageRecord>(LIST_MESSAGES_SQL)
            .bind(job.into_uuid())
            .bind(assignment.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Stamp every unread message not sent by `reader`.
    pub(crate) async fn mark_read(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        assignment: AssignmentUuid,
        reader: Role,
    ) -> Result<Vec<MessageRecord>, sqlx::Error> {
        query_as::<Postgres, MessageRecord>(MARK_READ_SQL)
            .bind(job.into_uuid())
            .bind(assignment.into_uuid())
            .bind(reader.as_str())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_unread(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        job: JobUuid,
        assignment: AssignmentUuid,
        reader: Role,
    ) -> Result<i64, sqlx::Error> {
        query_scalar::<Postgres, i64>(COUNT_UNREAD_SQL)
            .bind(job.into_uuid())
            .bind(assignment.into_uuid())
            .bind(reader.as_str())
            .fetch_one(&mut **tx)
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

impl<'r> FromRow<'r, PgRow> for MessageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let sender_role = row
            .try_get::<&str, _>("sender_role")?
            .parse::<Role>()
            .map_err(|error| decode_error("sender_role", error))?;

        let kind = row
            .try_get::<&str, _>("kind")?
            .parse::<MessageKind>()
            .map_err(|error| decode_error("kind", error))?;

        Ok(Self {
            uuid: MessageUuid::from_uuid(row.try_get("uuid")?),
            job_uuid: JobUuid::from_uuid(row.try_get("job_uuid")?),
            assignment_uuid: AssignmentUuid::from_uuid(row.try_get("assignment_uuid")?),
            sender: Actor::from_parts(sender_role, row.try_get("sender_uuid")?),
            kind,
            body: row.try_get("body")?,
            attachment_ref: row.try_get("attachment_ref")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            read_at: row
                .try_get::<Option<SqlxTimestamp>, _>("read_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Conversation {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            job_uuid: JobUuid::from_uuid(row.try_get("job_uuid")?),
            assignment_uuid: AssignmentUuid::from_uuid(row.try_get("assignment_uuid")?),
            dealer_uuid: DealerUuid::from_uuid(row.try_get("dealer_uuid")?),
            driver_uuid: DriverUuid::from_uuid(row.try_get("driver_uuid")?),
        })
    }
}
