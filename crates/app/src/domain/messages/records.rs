//! Message Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    domain::{assignments::records::AssignmentUuid, jobs::records::JobUuid},
    session::{Actor, DealerUuid, DriverUuid, Role, Session},
    uuids::TypedUuid,
};

/// Message UUID
pub type MessageUuid = TypedUuid<MessageRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Text,
    Image,
    File,
}

impl MessageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown message kind: {0}")]
pub struct UnknownMessageKind(pub String);

impl FromStr for MessageKind {
    type Err = UnknownMessageKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "file" => Ok(Self::File),
            other => Err(UnknownMessageKind(other.to_string())),
        }
    }
}

/// Message Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub uuid: MessageUuid,
    pub job_uuid: JobUuid,
    pub assignment_uuid: AssignmentUuid,
    pub sender: Actor,
    pub kind: MessageKind,
    pub body: String,
    pub attachment_ref: Option<String>,
    pub created_at: Timestamp,
    pub read_at: Option<Timestamp>,
}

impl MessageRecord {
    #[must_use]
    pub const fn sender_role(&self) -> Role {
        self.sender.role()
    }

    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// The two participants of one job/assignment conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversation {
    pub job_uuid: JobUuid,
    pub assignment_uuid: AssignmentUuid,
    pub dealer_uuid: DealerUuid,
    pub driver_uuid: DriverUuid,
}

impl Conversation {
    /// The participant behind `session`, if any.
    #[must_use]
    pub fn participant(&self, session: &Session) -> Option<Actor> {
        let participant = match session.actor {
            Actor::Dealer(dealer) => dealer == self.dealer_uuid,
            Actor::Driver(driver) => driver == self.driver_uuid,
        };

        participant.then_some(session.actor)
    }
}

/// The conversations on one job a session may follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationScope {
    pub job_uuid: JobUuid,
    /// `None` admits every conversation on the job.
    assignments: Option<Vec<AssignmentUuid>>,
}

impl ConversationScope {
    /// Every conversation on `job`, as seen by its dealer.
    #[must_use]
    pub const fn whole_job(job: JobUuid) -> Self {
        Self {
            job_uuid: job,
            assignments: None,
        }
    }

    /// Only the conversations on `job` belonging to `assignments`.
    #[must_use]
    pub fn assignments(job: JobUuid, assignments: Vec<AssignmentUuid>) -> Self {
        Self {
            job_uuid: job,
            assignments: Some(assignments),
        }
    }

    #[must_use]
    pub fn includes(&self, job: JobUuid, assignment: AssignmentUuid) -> bool {
        job == self.job_uuid
            && self
                .assignments
                .as_ref()
                .is_none_or(|assignments| assignments.contains(&assignment))
    }
}
