//! Messages Data

use thiserror::Error;

use crate::domain::{
    assignments::records::AssignmentUuid,
    jobs::records::JobUuid,
    messages::records::{MessageKind, MessageUuid},
};

/// Longest text body accepted, in characters.
pub const MAX_BODY_CHARS: usize = 4000;

/// New Message Data
///
/// The sender is taken from the session, never from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub uuid: MessageUuid,
    pub job: JobUuid,
    pub assignment: AssignmentUuid,
    pub kind: MessageKind,
    pub body: String,
    pub attachment_ref: Option<String>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MessageValidationError {
    #[error("text messages need a body")]
    EmptyBody,

    #[error("message body exceeds 4000 characters")]
    BodyTooLong,

    #[error("{0} messages need an attachment")]
    MissingAttachment(MessageKind),
}

impl NewMessage {
    /// Check the message can be stored and drop blank attachment references.
    ///
    /// # Errors
    ///
    /// Returns the first [`MessageValidationError`] found.
    pub fn normalize(self) -> Result<Self, MessageValidationError> {
        let attachment_ref = self
            .attachment_ref
            .map(|reference| reference.trim().to_string())
            .filter(|reference| !reference.is_empty());

        if self.body.chars().count() > MAX_BODY_CHARS {
            return Err(MessageValidationError::BodyTooLong);
        }

        match self.kind {
            MessageKind::Text if self.body.trim().is_empty() => {
                return Err(MessageValidationError::EmptyBody);
            }
            MessageKind::Image | MessageKind::File if attachment_ref.is_none() => {
                return Err(MessageValidationError::MissingAttachment(self.kind));
            }
            _ => {}
        }

        Ok(Self {
            attachment_ref,
            ..self
        })
    }
}
