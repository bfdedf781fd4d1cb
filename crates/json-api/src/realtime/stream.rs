//! Realtime Stream Handler

use std::sync::Arc;

use futures::stream;
use salvo::{oapi::extract::PathParam, prelude::*, sse::SseKeepAlive};
use tracing::{debug, info};

use haulage_app::realtime::{ChannelError, ChannelKey};

use crate::{
    extensions::*,
    observability::{StreamGuard, record_realtime_event},
    realtime::{
        access::authorize,
        payloads::{RESYNC, event_frame, resync_frame},
    },
    state::State,
};

/// Realtime Stream Handler
///
/// Subscribes to one channel (`dealer-jobs:{uuid}`, `open-jobs`, `job:{uuid}`,
/// `job-messages:{uuid}` or `job-presence:{uuid}`) and streams its events. Events are
/// named `job`, `message` or `typing`. Message and presence channels only carry the
/// conversations the session takes part in. A `resync` event means events were dropped and
/// the client should refetch before applying further events. Closing the connection
/// unsubscribes.
#[endpoint(
    tags("realtime"),
    summary = "Subscribe To Channel",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Event stream"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown channel"),
        (status_code = StatusCode::FORBIDDEN, description = "Channel not visible to this session"),
        (status_code = StatusCode::NOT_FOUND, description = "Job not found"),
    ),
)]
pub(crate) async fn handler(
    channel: PathParam<String>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;

    let key: ChannelKey = channel.into_inner().parse().or_400("Unknown channel")?;

    let audience = authorize(&state.app, &session, key).await?;

    let subscription = state.app.realtime.subscribe(key);

    info!(channel = %key, actor = %session.actor, "realtime stream opened");

    let events = stream::unfold(
        (subscription, audience, session, StreamGuard::open()),
        |(mut subscription, audience, session, guard)| async move {
            let key = subscription.key();

            let frame = loop {
                match subscription.recv().await {
                    Ok(event) if !audience.admits(&event) => {}
                    Ok(event) => {
                        record_realtime_event(event.name());

                        break event_frame(&event, &session);
                    }
                    Err(ChannelError::Lagged(missed)) => {
                        debug!(channel = %key, missed, "realtime subscriber lagged");
                        record_realtime_event(RESYNC);

                        break resync_frame(key, missed);
                    }
                    Err(ChannelError::Closed) => {
                        debug!(channel = %key, "realtime stream closed");

                        return None;
                    }
                }
            };

            Some((frame, (subscription, audience, session, guard)))
        },
    );

    SseKeepAlive::new(events)
        .max_interval(state.sse_keepalive)
        .stream(res);

    Ok(())
}
