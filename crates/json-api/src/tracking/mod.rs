//! Public Tracking
//!
//! Unauthenticated, read-only view of a single job for the customer holding its token.

pub(crate) mod lookup;
pub(crate) mod models;
