//! Session Records

use jiff::Timestamp;

use crate::{domain::sessions::token::SessionToken, session::Actor, uuids::TypedUuid};

/// Session UUID
pub type SessionUuid = TypedUuid<SessionRecord>;

/// Session Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub uuid: SessionUuid,
    pub actor: Actor,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// Freshly issued session together with its raw token.
#[derive(Debug)]
pub struct IssuedSession {
    pub record: SessionRecord,
    pub token: SessionToken,
}
