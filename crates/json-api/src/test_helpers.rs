//! Test helpers.

use std::{sync::Arc, time::Duration};

use haulage_app::{
    context::AppContext,
    domain::{
        assignments::{MockAssignmentsService, records::{AssignmentRecord, AssignmentUuid}},
        jobs::{
            MockJobsService,
            records::{Customer, JobRecord, JobState, JobType, JobUuid},
            tracking::TrackingToken,
        },
        messages::{
            MockMessagesService,
            records::{MessageKind, MessageRecord, MessageUuid},
        },
        notifications::MockNotificationsService,
        presence::MockPresenceService,
        sessions::MockSessionsService,
    },
    realtime::RealtimeHub,
    session::{Actor, DealerUuid, DriverUuid, Session},
};
use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::state::State;

pub(crate) const TEST_DEALER: DealerUuid = DealerUuid::from_uuid(Uuid::from_u128(1));
pub(crate) const TEST_DRIVER: DriverUuid = DriverUuid::from_uuid(Uuid::from_u128(2));

pub(crate) fn dealer() -> Session {
    Session::dealer(TEST_DEALER)
}

pub(crate) fn driver() -> Session {
    Session::driver(TEST_DRIVER)
}

/// One mock per service. Mocks without expectations fail the test when called.
#[derive(Default)]
pub(crate) struct Mocks {
    pub jobs: MockJobsService,
    pub assignments: MockAssignmentsService,
    pub messages: MockMessagesService,
    pub presence: MockPresenceService,
    pub notifications: MockNotificationsService,
    pub sessions: MockSessionsService,
    pub realtime: RealtimeHub,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::shared(
            AppContext {
                jobs: Arc::new(self.jobs),
                assignments: Arc::new(self.assignments),
                messages: Arc::new(self.messages),
                presence: Arc::new(self.presence),
                notifications: Arc::new(self.notifications),
                sessions: Arc::new(self.sessions),
                realtime: self.realtime,
            },
            Duration::from_secs(15),
        )
    }
}

/// Router with mocked state and `session` already authenticated.
pub(crate) fn service_as(session: Session, mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject(session))
            .push(route),
    )
}

/// Router with mocked state and no session.
pub(crate) fn anonymous_service(mocks: Mocks, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(mocks.into_state())).push(route))
}

pub(crate) fn make_job(uuid: JobUuid) -> JobRecord {
    JobRecord {
        uuid,
        dealer_uuid: TEST_DEALER,
        job_type: JobType::Delivery,
        state: JobState::Open,
        pickup_address: "12 Depot Road, Leeds".to_string(),
        delivery_address: "4 Harbour Lane, Hull".to_string(),
        vehicle: None,
        customer: Customer {
            name: "Grace Hopper".to_string(),
            phone: None,
            email: None,
        },
        tracking_token: TrackingToken::generate(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_assignment(job: JobUuid) -> AssignmentRecord {
    AssignmentRecord {
        uuid: AssignmentUuid::new(),
        job_uuid: job,
        driver_uuid: TEST_DRIVER,
        accepted_at: Timestamp::UNIX_EPOCH,
        started_at: None,
        ended_at: None,
    }
}

pub(crate) fn make_message(job: JobUuid, assignment: AssignmentUuid, body: &str) -> MessageRecord {
    MessageRecord {
        uuid: MessageUuid::new(),
        job_uuid: job,
        assignment_uuid: assignment,
        sender: Actor::Driver(TEST_DRIVER),
        kind: MessageKind::Text,
        body: body.to_string(),
        attachment_ref: None,
        created_at: Timestamp::UNIX_EPOCH,
        read_at: None,
    }
}
