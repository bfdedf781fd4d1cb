//! Haulage Domain Concerns

pub mod assignments;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod presence;
pub mod sessions;
