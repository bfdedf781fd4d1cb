//! Sessions service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::sessions::{
        errors::SessionsServiceError,
        records::{IssuedSession, SessionRecord, SessionUuid},
        repository::PgSessionsRepository,
        token::SessionToken,
    },
    session::{Actor, Session},
};

#[derive(Debug, Clone)]
pub struct PgSessionsService {
    db: Db,
    repository: PgSessionsRepository,
}

impl PgSessionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSessionsRepository::new(),
        }
    }
}

#[async_trait]
impl SessionsService for PgSessionsService {
    async fn authenticate_bearer(&self, token: &str) -> Result<Session, SessionsServiceError> {
        let token = SessionToken::parse(token).ok_or(SessionsServiceError::Unauthenticated)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .authenticate_session(&mut tx, &token.hash())
            .await?
            .ok_or(SessionsServiceError::Unauthenticated)?;

        tx.commit().await?;

        Ok(Session {
            actor: record.actor,
        })
    }

    async fn issue(&self, actor: Actor) -> Result<IssuedSession, SessionsServiceError> {
        let token = SessionToken::generate();

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .create_session(&mut tx, SessionUuid::new(), actor, &token.hash())
            .await?;

        tx.commit().await?;

        info!(session_uuid = %record.uuid, actor = %actor, "issued session");

        Ok(IssuedSession { record, token })
    }

    async fn revoke(&self, token: &str) -> Result<SessionRecord, SessionsServiceError> {
        let token = SessionToken::parse(token).ok_or(SessionsServiceError::NotFound)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .revoke_session(&mut tx, &token.hash())
            .await?
            .ok_or(SessionsServiceError::NotFound)?;

        tx.commit().await?;

        info!(session_uuid = %record.uuid, "revoked session");

        Ok(record)
    }
}

#[automock]
#[async_trait]
/// Bearer-token sessions.
pub trait SessionsService: Send + Sync {
    /// Resolve a bearer token to the session it was issued for.
    async fn authenticate_bearer(&self, token: &str) -> Result<Session, SessionsServiceError>;

    /// Create a session for `actor`; the raw token is only available on the result.
    async fn issue(&self, actor: Actor) -> Result<IssuedSession, SessionsServiceError>;

    /// Revoke a live session.
    async fn revoke(&self, token: &str) -> Result<SessionRecord, SessionsServiceError>;
}
