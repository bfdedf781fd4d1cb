//! Realtime event payloads.

use std::sync::Arc;

use crate::{
    domain::{
        assignments::records::AssignmentUuid,
        jobs::records::{JobRecord, JobUuid},
        messages::records::MessageRecord,
    },
    session::Actor,
};

/// Kind of row change behind an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Insert,
    Update,
}

/// Ephemeral typing state for one participant of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingSignal {
    pub job: JobUuid,
    pub assignment: AssignmentUuid,
    pub actor: Actor,
    pub typing: bool,
}

/// Event delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Job {
        change: Change,
        job: Arc<JobRecord>,
    },
    Message {
        change: Change,
        message: Arc<MessageRecord>,
    },
    Typing(TypingSignal),
}

impl RealtimeEvent {
    #[must_use]
    pub fn job(change: Change, job: JobRecord) -> Self {
        Self::Job {
            change,
            job: Arc::new(job),
        }
    }

    #[must_use]
    pub fn message(change: Change, message: MessageRecord) -> Self {
        Self::Message {
            change,
            message: Arc::new(message),
        }
    }

    /// Short label used in logs and SSE event names.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Job { .. } => "job",
            Self::Message { .. } => "message",
            Self::Typing(_) => "typing",
        }
    }

    /// The job/assignment conversation a message or typing event belongs to.
    #[must_use]
    pub fn conversation(&self) -> Option<(JobUuid, AssignmentUuid)> {
        match self {
            Self::Job { .. } => None,
            Self::Message { message, .. } => Some((message.job_uuid, message.assignment_uuid)),
            Self::Typing(signal) => Some((signal.job, signal.assignment)),
        }
    }
}
