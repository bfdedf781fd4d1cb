//! Test Helpers

use testresult::TestResult;

use crate::{
    domain::{
        assignments::{AssignmentsService, records::AssignmentUuid},
        jobs::{
            JobsService, JobsServiceError,
            data::NewJob,
            records::{Customer, JobRecord, JobType, JobUuid, Vehicle},
        },
        messages::{
            data::NewMessage,
            records::{MessageKind, MessageUuid},
        },
    },
    session::{DriverUuid, Session},
    test::TestContext,
};

pub(crate) fn new_job() -> NewJob {
    NewJob {
        uuid: JobUuid::new(),
        job_type: JobType::Delivery,
        pickup_address: "12 Depot Road, Leeds".to_string(),
        delivery_address: "4 Harbour Lane, Hull".to_string(),
        vehicle: Some(Vehicle {
            year: Some(2021),
            make: Some("Volvo".to_string()),
            model: Some("XC40".to_string()),
            vin: None,
        }),
        customer: Customer {
            name: "Grace Hopper".to_string(),
            phone: Some("+44 113 496 0000".to_string()),
            email: Some("grace@example.com".to_string()),
        },
    }
}

pub(crate) async fn create_job(
    ctx: &TestContext,
    dealer: &Session,
) -> Result<JobRecord, JobsServiceError> {
    ctx.jobs.create_job(dealer, new_job()).await
}

pub(crate) fn driver_session() -> Session {
    Session::driver(DriverUuid::new())
}

/// A job with an active assignment, ready for messaging.
#[derive(Debug, Clone)]
pub(crate) struct OpenConversation {
    pub job: JobUuid,
    pub assignment: AssignmentUuid,
    pub driver: Session,
}

pub(crate) async fn open_conversation(ctx: &TestContext) -> TestResult<OpenConversation> {
    let job = create_job(ctx, &ctx.dealer).await?;
    let driver = driver_session();
    let driver_uuid = driver.as_driver().ok_or("driver session")?;

    let assignment = ctx
        .assignments
        .accept_job(&driver, job.uuid, driver_uuid)
        .await?;

    Ok(OpenConversation {
        job: job.uuid,
        assignment: assignment.uuid,
        driver,
    })
}

pub(crate) fn text_message(conversation: &OpenConversation, body: &str) -> NewMessage {
    NewMessage {
        uuid: MessageUuid::new(),
        job: conversation.job,
        assignment: conversation.assignment,
        kind: MessageKind::Text,
        body: body.to_string(),
        attachment_ref: None,
    }
}
