//! Messages
//!
//! Conversation routes live under `/jobs/{job}/assignments/{assignment}`.

mod errors;
mod handlers;
pub(crate) mod models;

pub(crate) use errors::{into_status_error, presence_status_error};
pub(crate) use handlers::*;
