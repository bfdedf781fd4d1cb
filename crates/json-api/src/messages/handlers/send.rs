//! Send Message Handler

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

use haulage_app::domain::messages::{data::NewMessage, records::MessageUuid};

use crate::{
    extensions::*,
    messages::{
        into_status_error,
        models::{MessageKindBody, MessageResponse},
    },
    state::State,
};

/// Send Message Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SendMessageRequest {
    /// Client-chosen message UUID, used to reconcile optimistic sends
    pub uuid: Option<Uuid>,

    #[serde(default = "text_kind")]
    pub kind: MessageKindBody,

    #[serde(default)]
    pub body: String,

    pub attachment_ref: Option<String>,
}

const fn text_kind() -> MessageKindBody {
    MessageKindBody::Text
}

/// Send Message Handler
///
/// The sender is always the authenticated participant.
#[endpoint(
    tags("messages"),
    summary = "Send Message",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Message sent"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid message"),
        (status_code = StatusCode::FORBIDDEN, description = "Not a participant"),
        (status_code = StatusCode::NOT_FOUND, description = "Conversation not found"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
#[tracing::instrument(name = "messages.send", skip(job, assignment, json, depot, res), err)]
pub(crate) async fn handler(
    job: PathParam<Uuid>,
    assignment: PathParam<Uuid>,
    json: JsonBody<SendMessageRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<MessageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let session = depot.session_or_401()?;
    let request = json.into_inner();

    let message = NewMessage {
        uuid: request.uuid.map_or_else(MessageUuid::new, MessageUuid::from_uuid),
        job: job.into_inner().into(),
        assignment: assignment.into_inner().into(),
        kind: request.kind.into(),
        body: request.body,
        attachment_ref: request.attachment_ref,
    };

    let message = state
        .app
        .messages
        .send_message(&session, message)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(message.into()))
}
