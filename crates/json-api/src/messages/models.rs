//! Message Models

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haulage_app::{
    domain::messages::records::{MessageKind, MessageRecord},
    session::{Actor, Role},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MessageKindBody {
    Text,
    Image,
    File,
}

impl From<MessageKindBody> for MessageKind {
    fn from(kind: MessageKindBody) -> Self {
        match kind {
            MessageKindBody::Text => MessageKind::Text,
            MessageKindBody::Image => MessageKind::Image,
            MessageKindBody::File => MessageKind::File,
        }
    }
}

impl From<MessageKind> for MessageKindBody {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Text => MessageKindBody::Text,
            MessageKind::Image => MessageKindBody::Image,
            MessageKind::File => MessageKindBody::File,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RoleBody {
    Dealer,
    Driver,
}

impl From<Role> for RoleBody {
    fn from(role: Role) -> Self {
        match role {
            Role::Dealer => RoleBody::Dealer,
            Role::Driver => RoleBody::Driver,
        }
    }
}

/// A conversation participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ParticipantBody {
    pub role: RoleBody,
    pub uuid: Uuid,
}

impl From<Actor> for ParticipantBody {
    fn from(actor: Actor) -> Self {
        Self {
            role: actor.role().into(),
            uuid: actor.uuid(),
        }
    }
}

/// Message Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MessageResponse {
    pub uuid: Uuid,
    pub job_uuid: Uuid,
    pub assignment_uuid: Uuid,
    pub sender: ParticipantBody,
    pub kind: MessageKindBody,
    pub body: String,
    pub attachment_ref: Option<String>,
    pub created_at: String,

    /// Set once the other participant has read the message
    pub read_at: Option<String>,
}

impl From<MessageRecord> for MessageResponse {
    fn from(record: MessageRecord) -> Self {
        Self {
            uuid: record.uuid.into_uuid(),
            job_uuid: record.job_uuid.into_uuid(),
            assignment_uuid: record.assignment_uuid.into_uuid(),
            sender: record.sender.into(),
            kind: record.kind.into(),
            body: record.body,
            attachment_ref: record.attachment_ref,
            created_at: record.created_at.to_string(),
            read_at: record.read_at.map(|at| at.to_string()),
        }
    }
}

/// Messages Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MessagesResponse {
    pub messages: Vec<MessageResponse>,
}

/// Count Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CountResponse {
    pub count: u64,
}

/// Typing Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TypingResponse {
    pub typing: Vec<ParticipantBody>,
}
