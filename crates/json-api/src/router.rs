//! Route table.

use salvo::prelude::*;

use crate::{
    assignments, auth, drivers, healthcheck, jobs, messages, observability::metrics_handler,
    realtime, tracking,
};

/// Every API route. State must be injected by the caller.
pub(crate) fn api_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(Router::with_path("track/{token}").get(tracking::lookup::handler))
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(jobs_router())
                .push(
                    Router::with_path("drivers/{driver}")
                        .push(Router::with_path("unseen").get(drivers::unseen::handler))
                        .push(
                            Router::with_path("seen")
                                .get(drivers::seen::get_handler)
                                .post(drivers::seen::mark_handler),
                        ),
                )
                .push(Router::with_path("realtime/{channel}").get(realtime::stream::handler)),
        )
}

fn jobs_router() -> Router {
    Router::with_path("jobs")
        .get(jobs::index::handler)
        .post(jobs::create::handler)
        .push(
            Router::with_path("{job}")
                .get(jobs::get::handler)
                .push(Router::with_path("status").post(jobs::status::handler))
                .push(Router::with_path("accept").post(assignments::accept::handler))
                .push(Router::with_path("assignment").get(assignments::active::handler))
                .push(
                    Router::with_path("assignments/{assignment}")
                        .push(
                            Router::with_path("messages")
                                .get(messages::index::handler)
                                .post(messages::send::handler)
                                .push(Router::with_path("read").post(messages::read::handler))
                                .push(Router::with_path("unread").get(messages::unread::handler)),
                        )
                        .push(
                            Router::with_path("typing")
                                .get(messages::typing::list_handler)
                                .put(messages::typing::set_handler),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        http::header::AUTHORIZATION,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use haulage_app::domain::{jobs::records::JobUuid, sessions::SessionsServiceError};

    use crate::test_helpers::{Mocks, TEST_DRIVER, driver};

    use super::*;

    fn service(mocks: Mocks) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(mocks.into_state()))
                .push(api_router()),
        )
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.sessions.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com/jobs")
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn healthcheck_is_public() -> TestResult {
        let res = TestClient::get("http://example.com/healthcheck")
            .send(&service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn bearer_session_reaches_nested_routes() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_authenticate_bearer()
            .once()
            .withf(|token| token == "hs_valid")
            .return_once(|_| Ok(driver()));
        mocks
            .notifications
            .expect_fetch_unseen_count()
            .once()
            .return_once(|_, _| Ok(1));

        let mut res = TestClient::get(format!("http://example.com/drivers/{TEST_DRIVER}/unseen"))
            .add_header(AUTHORIZATION, "Bearer hs_valid", true)
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(res.take_string().await?.contains("\"count\":1"));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_token_stops_the_chain() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .sessions
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(SessionsServiceError::Unauthenticated));
        mocks.assignments.expect_accept_job().never();

        let res = TestClient::post(format!("http://example.com/jobs/{}/accept", JobUuid::new()))
            .add_header(AUTHORIZATION, "Bearer hs_revoked", true)
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
