//! Realtime
//!
//! Streams hub channels to clients as Server-Sent Events.

mod access;
mod payloads;
pub(crate) mod stream;
