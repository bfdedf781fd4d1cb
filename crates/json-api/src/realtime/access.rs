//! Channel access rules.

use salvo::http::StatusError;

use haulage_app::{
    context::AppContext,
    domain::messages::records::ConversationScope,
    realtime::{ChannelKey, RealtimeEvent},
    session::Session,
};

use crate::{jobs::into_status_error, messages::into_status_error as conversation_status_error};

/// Which events on an authorized channel reach the subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Audience {
    Everything,
    Conversations(ConversationScope),
}

impl Audience {
    pub(super) fn admits(&self, event: &RealtimeEvent) -> bool {
        match (self, event.conversation()) {
            (Self::Everything, _) | (Self::Conversations(_), None) => true,
            (Self::Conversations(scope), Some((job, assignment))) => {
                scope.includes(job, assignment)
            }
        }
    }
}

/// Check `session` may listen on `key`.
///
/// Dealer feeds belong to their dealer and the open pool to drivers. `job:` follows the
/// visibility of the job itself. Message and presence channels are limited to the
/// conversations the session takes part in.
pub(super) async fn authorize(
    app: &AppContext,
    session: &Session,
    key: ChannelKey,
) -> Result<Audience, StatusError> {
    match key {
        ChannelKey::DealerJobs(dealer) if session.is_dealer(dealer) => Ok(Audience::Everything),
        ChannelKey::DealerJobs(_) => Err(StatusError::forbidden()),
        ChannelKey::OpenJobs if session.as_driver().is_some() => Ok(Audience::Everything),
        ChannelKey::OpenJobs => Err(StatusError::forbidden().brief("Driver session required")),
        ChannelKey::Job(job) => app
            .jobs
            .get_job(session, job)
            .await
            .map(|_| Audience::Everything)
            .map_err(into_status_error),
        ChannelKey::JobMessages(job) | ChannelKey::JobPresence(job) => app
            .messages
            .conversation_scope(session, job)
            .await
            .map(Audience::Conversations)
            .map_err(conversation_status_error),
    }
}
