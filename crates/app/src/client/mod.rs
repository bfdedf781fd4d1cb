//! Client-facing reconciliation helpers.
//!
//! These types hold the local state a dealer or driver view keeps in sync with the
//! realtime feed, and the rules for correcting it after a resync or a failed action.

pub mod connection;
pub mod open_jobs;
pub mod typing;
pub mod unseen;

pub use connection::{ConnectionState, LiveChannel, LiveUpdate, ReconnectPolicy};
pub use open_jobs::{AcceptReconciliation, JOB_TAKEN_NOTICE, OpenJobsView, ViewChange};
pub use typing::{TypingAction, TypingDebouncer};
pub use unseen::{NewJobAlert, UnseenJobsTracker};

#[cfg(test)]
pub(crate) mod test_support;
