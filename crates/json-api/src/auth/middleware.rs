//! Auth middleware.

use std::sync::Arc;

use haulage_app::domain::sessions::SessionsServiceError;
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use crate::{extensions::*, state::State};

/// Resolve the bearer token to a [`Session`](haulage_app::session::Session) for the
/// rest of the chain.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());
            ctrl.skip_rest();

            return;
        }
    };

    let session = match state.app.sessions.authenticate_bearer(&token).await {
        Ok(session) => session,
        Err(SessionsServiceError::Unauthenticated | SessionsServiceError::NotFound) => {
            res.render(StatusError::unauthorized().brief("Invalid session token"));
            ctrl.skip_rest();

            return;
        }
        Err(source) => {
            error!("failed to authenticate session token: {source}");

            res.render(StatusError::service_unavailable());
            ctrl.skip_rest();

            return;
        }
    };

    depot.insert_session(session);

    ctrl.call_next(req, depot, res).await;
}

/// Token from `Authorization: Bearer <token>`, or from the `access_token` query
/// parameter for clients such as `EventSource` that cannot set headers.
fn extract_bearer_token(req: &Request) -> Option<String> {
    if let Some(value) = req.headers().get(AUTHORIZATION) {
        let value = value.to_str().ok()?;
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();

        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }

        return Some(token.to_owned());
    }

    req.query::<String>("access_token")
        .filter(|token| !token.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use haulage_app::{
        domain::sessions::MockSessionsService,
        session::{DriverUuid, Session},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::test_helpers::Mocks;

    use super::*;

    #[salvo::handler]
    async fn echo_actor(depot: &mut Depot, res: &mut Response) {
        let actor = depot
            .session_or_401()
            .map_or_else(|_| "missing".to_string(), |session| session.actor.to_string());

        res.render(actor);
    }

    fn make_service(sessions: MockSessionsService) -> Service {
        let state = Mocks {
            sessions,
            ..Mocks::default()
        }
        .into_state();

        let router = Router::new()
            .hoop(salvo::affix_state::inject(state))
            .hoop(handler)
            .push(Router::new().get(echo_actor));

        Service::new(router)
    }

    #[tokio::test]
    async fn missing_authorization_header_returns_401() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn non_bearer_authorization_header_returns_401() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Basic abc123", true)
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_returns_401() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_authenticate_bearer()
            .once()
            .withf(|token| token == "hs_abc123")
            .return_once(|_| Err(SessionsServiceError::Unauthenticated));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer hs_abc123", true)
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn valid_token_injects_session() -> TestResult {
        let session = Session::driver(DriverUuid::from_uuid(Uuid::nil()));

        let mut sessions = MockSessionsService::new();

        sessions
            .expect_authenticate_bearer()
            .once()
            .withf(|token| token == "hs_abc123")
            .return_once(move |_| Ok(session));

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer hs_abc123", true)
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, session.actor.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn query_token_is_accepted_for_event_streams() -> TestResult {
        let session = Session::driver(DriverUuid::from_uuid(Uuid::nil()));

        let mut sessions = MockSessionsService::new();

        sessions
            .expect_authenticate_bearer()
            .once()
            .withf(|token| token == "hs_query")
            .return_once(move |_| Ok(session));

        let res = TestClient::get("http://example.com?access_token=hs_query")
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
