//! SSE payloads.

use salvo::{oapi::ToSchema, sse::SseEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haulage_app::{
    realtime::{Change, ChannelKey, RealtimeEvent, TypingSignal},
    session::Session,
};

use crate::{
    jobs::models::{JobResponse, JobView},
    messages::models::{MessageResponse, ParticipantBody},
};

/// Event name sent when the subscriber missed events and must refetch.
pub(super) const RESYNC: &str = "resync";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ChangeBody {
    Insert,
    Update,
}

impl From<Change> for ChangeBody {
    fn from(change: Change) -> Self {
        match change {
            Change::Insert => ChangeBody::Insert,
            Change::Update => ChangeBody::Update,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JobEventBody {
    pub change: ChangeBody,
    pub job: JobResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MessageEventBody {
    pub change: ChangeBody,
    pub message: MessageResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TypingEventBody {
    pub job_uuid: Uuid,
    pub assignment_uuid: Uuid,
    pub participant: ParticipantBody,
    pub typing: bool,
}

impl From<TypingSignal> for TypingEventBody {
    fn from(signal: TypingSignal) -> Self {
        Self {
            job_uuid: signal.job.into_uuid(),
            assignment_uuid: signal.assignment.into_uuid(),
            participant: signal.actor.into(),
            typing: signal.typing,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ResyncEventBody {
    pub channel: String,
    pub missed: u64,
}

/// Render a hub event for `session` as an SSE frame named after the event kind.
pub(super) fn event_frame(
    event: &RealtimeEvent,
    session: &Session,
) -> Result<SseEvent, serde_json::Error> {
    let frame = SseEvent::default().name(event.name());

    match event {
        RealtimeEvent::Job { change, job } => frame.json(JobEventBody {
            change: (*change).into(),
            job: JobResponse::project(job.as_ref().clone(), JobView::streamed(session, job)),
        }),
        RealtimeEvent::Message { change, message } => frame.json(MessageEventBody {
            change: (*change).into(),
            message: message.as_ref().clone().into(),
        }),
        RealtimeEvent::Typing(signal) => frame.json(TypingEventBody::from(*signal)),
    }
}

/// Tell the subscriber it fell behind on `key`.
pub(super) fn resync_frame(key: ChannelKey, missed: u64) -> Result<SseEvent, serde_json::Error> {
    SseEvent::default().name(RESYNC).json(ResyncEventBody {
        channel: key.to_string(),
        missed,
    })
}

#[cfg(test)]
mod tests {
    use haulage_app::{
        domain::{assignments::records::AssignmentUuid, jobs::records::JobUuid},
        session::Actor,
    };
    use testresult::TestResult;

    use crate::test_helpers::{TEST_DRIVER, driver, make_job};

    use super::*;

    #[test]
    fn typing_body_carries_participant() {
        let job = JobUuid::new();
        let body = TypingEventBody::from(TypingSignal {
            job,
            assignment: AssignmentUuid::new(),
            actor: Actor::Driver(TEST_DRIVER),
            typing: true,
        });

        assert_eq!(body.job_uuid, job.into_uuid());
        assert_eq!(body.participant.uuid, TEST_DRIVER.into_uuid());
        assert!(body.typing, "typing flag should be kept");
    }

    #[test]
    fn job_frames_render() -> TestResult {
        let event = RealtimeEvent::job(Change::Insert, make_job(JobUuid::new()));

        event_frame(&event, &driver())?;
        resync_frame(ChannelKey::OpenJobs, 3)?;

        Ok(())
    }
}
