//! Typing Presence Handlers

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    messages::{models::TypingResponse, presence_status_error},
    state::State,
};

/// Set Typing Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetTypingRequest {
    pub typing: bool,
}

/// Set Typing Handler
///
/// Signals lapse on their own unless refreshed; clients resend `true` while the user
/// keeps typing.
#[endpoint(
    tags("messages"),
    summary = "Set Typing",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Signal recorded"),
        (status_code = StatusCode::FORBIDDEN, description = "Not a participant"),
        (status_code = StatusCode::NOT_FOUND, description = "Conversation not found"),
    ),
)]
pub(crate) async fn set_handler(
    job: PathParam<Uuid>,
    assignment: PathParam<Uuid>,
    json: JsonBody<SetTypingRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    state
        .app
        .presence
        .set_typing(
            &session,
            job.into_inner().into(),
            assignment.into_inner().into(),
            json.into_inner().typing,
        )
        .await
        .map_err(presence_status_error)?;

    res.status_code(StatusCode::NO_CONTENT);

    Ok(())
}

/// Typing Participants Handler
#[endpoint(
    tags("messages"),
    summary = "Typing Participants",
    security(("bearer_auth" = []))
)]
pub(crate) async fn list_handler(
    job: PathParam<Uuid>,
    assignment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<TypingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let typing = state
        .app
        .presence
        .typing_participants(&session, job.into_inner().into(), assignment.into_inner().into())
        .await
        .map_err(presence_status_error)?;

    Ok(Json(TypingResponse {
        typing: typing.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use haulage_app::{
        domain::{
            assignments::records::AssignmentUuid, jobs::records::JobUuid,
            presence::PresenceServiceError,
        },
        session::Actor,
    };

    use crate::{
        messages::models::RoleBody,
        test_helpers::{Mocks, TEST_DRIVER, dealer, driver, service_as},
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("jobs/{job}/assignments/{assignment}/typing")
            .put(set_handler)
            .get(list_handler)
    }

    fn url(job: JobUuid, assignment: AssignmentUuid) -> String {
        format!("http://example.com/jobs/{job}/assignments/{assignment}/typing")
    }

    #[tokio::test]
    async fn put_forwards_signal() -> TestResult {
        let job = JobUuid::new();
        let assignment = AssignmentUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .presence
            .expect_set_typing()
            .once()
            .withf(move |session, requested_job, requested_assignment, typing| {
                *session == driver()
                    && *requested_job == job
                    && *requested_assignment == assignment
                    && *typing
            })
            .return_once(|_, _, _, _| Ok(()));

        let res = TestClient::put(url(job, assignment))
            .json(&json!({ "typing": true }))
            .send(&service_as(driver(), mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn put_by_outsider_returns_403() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .presence
            .expect_set_typing()
            .once()
            .return_once(|_, _, _, _| Err(PresenceServiceError::Forbidden));

        let res = TestClient::put(url(JobUuid::new(), AssignmentUuid::new()))
            .json(&json!({ "typing": false }))
            .send(&service_as(driver(), mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn get_lists_typing_participants() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .presence
            .expect_typing_participants()
            .once()
            .return_once(|_, _, _| Ok(vec![Actor::Driver(TEST_DRIVER)]));

        let mut res = TestClient::get(url(JobUuid::new(), AssignmentUuid::new()))
            .send(&service_as(dealer(), mocks, route()))
            .await;

        let body: TypingResponse = res.take_json().await?;

        assert_eq!(body.typing.len(), 1);
        assert_eq!(body.typing.first().map(|participant| participant.role), Some(RoleBody::Driver));

        Ok(())
    }
}
