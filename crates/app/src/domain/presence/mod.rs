//! Typing Presence
//!
//! Typing state is ephemeral: it lives only in memory, expires on its own and is never
//! written to the message history.

pub mod errors;
pub mod service;
pub mod store;

pub use errors::PresenceServiceError;
pub use service::*;
pub use store::PresenceStore;
