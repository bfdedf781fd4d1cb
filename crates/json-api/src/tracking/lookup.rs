//! Track Job Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use haulage_app::domain::jobs::tracking::TrackingToken;

use crate::{extensions::*, jobs::into_status_error, state::State, tracking::models::TrackingResponse};

/// Track Job Handler
///
/// Malformed and unknown tokens are indistinguishable: both return 404.
#[endpoint(tags("tracking"), summary = "Track Job")]
pub(crate) async fn handler(
    token: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<TrackingResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let token = TrackingToken::parse(&token.into_inner()).ok_or_else(StatusError::not_found)?;

    let job = state
        .app
        .jobs
        .get_job_by_tracking_token(&token)
        .await
        .map_err(into_status_error)?;

    Ok(Json(job.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use haulage_app::domain::jobs::{JobsServiceError, records::JobUuid};

    use crate::{
        jobs::models::JobStatusBody,
        test_helpers::{Mocks, anonymous_service, make_job},
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("track/{token}").get(handler)
    }

    #[tokio::test]
    async fn anonymous_lookup_returns_public_view() -> TestResult {
        let job = make_job(JobUuid::new());
        let token = job.tracking_token.clone();
        let expected = token.clone();
        let mut mocks = Mocks::default();

        mocks
            .jobs
            .expect_get_job_by_tracking_token()
            .once()
            .withf(move |requested| *requested == expected)
            .return_once(move |_| Ok(job));

        let mut res = TestClient::get(format!("http://example.com/track/{token}"))
            .send(&anonymous_service(mocks, route()))
            .await;

        let body = res.take_string().await?;
        let parsed: TrackingResponse = serde_json::from_str(&body)?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(parsed.status, JobStatusBody::Open);
        assert!(!body.contains("Grace Hopper"), "customer details leaked: {body}");

        Ok(())
    }

    #[tokio::test]
    async fn malformed_token_never_reaches_the_service() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.jobs.expect_get_job_by_tracking_token().never();

        let res = TestClient::get("http://example.com/track/not-a-token")
            .send(&anonymous_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .jobs
            .expect_get_job_by_tracking_token()
            .once()
            .return_once(|_| Err(JobsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/track/{}", TrackingToken::generate()))
            .send(&anonymous_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
