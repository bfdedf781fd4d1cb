//! State

use std::{sync::Arc, time::Duration};

use haulage_app::context::AppContext;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Interval between keep-alive comments on idle event streams.
    pub(crate) sse_keepalive: Duration,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, sse_keepalive: Duration) -> Self {
        Self { app, sse_keepalive }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, sse_keepalive: Duration) -> Arc<Self> {
        Arc::new(Self::new(app, sse_keepalive))
    }
}
