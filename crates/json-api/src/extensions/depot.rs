//! Depot helper extensions.

use std::any::Any;

use haulage_app::session::Session;
use salvo::prelude::{Depot, StatusError};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }
}

/// Access to the session the auth middleware resolved for this request.
pub(crate) trait SessionDepotExt {
    fn insert_session(&mut self, session: Session);

    fn session_or_401(&self) -> Result<Session, StatusError>;
}

impl SessionDepotExt for Depot {
    fn insert_session(&mut self, session: Session) {
        self.inject(session);
    }

    fn session_or_401(&self) -> Result<Session, StatusError> {
        self.obtain::<Session>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized())
    }
}
