//! Unread Count Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    messages::{into_status_error, models::CountResponse},
    state::State,
};

/// Unread Count Handler
///
/// Counts messages from the other participant the caller has not read yet.
#[endpoint(
    tags("messages"),
    summary = "Unread Message Count",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    assignment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CountResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let count = state
        .app
        .messages
        .unread_count(&session, job.into_inner().into(), assignment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(CountResponse { count }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use haulage_app::domain::{
        assignments::records::AssignmentUuid, jobs::records::JobUuid,
        messages::MessagesServiceError,
    };

    use crate::test_helpers::{Mocks, driver, service_as};

    use super::*;

    fn route() -> Router {
        Router::with_path("jobs/{job}/assignments/{assignment}/messages/unread").get(handler)
    }

    fn url() -> String {
        format!(
            "http://example.com/jobs/{}/assignments/{}/messages/unread",
            JobUuid::new(),
            AssignmentUuid::new()
        )
    }

    #[tokio::test]
    async fn returns_unread_count() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .messages
            .expect_unread_count()
            .once()
            .return_once(|_, _, _| Ok(2));

        let mut res = TestClient::get(url())
            .send(&service_as(driver(), mocks, route()))
            .await;

        let body: CountResponse = res.take_json().await?;

        assert_eq!(body.count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn outsider_returns_403() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .messages
            .expect_unread_count()
            .once()
            .return_once(|_, _, _| Err(MessagesServiceError::Forbidden));

        let res = TestClient::get(url())
            .send(&service_as(driver(), mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
