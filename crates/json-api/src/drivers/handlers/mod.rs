//! Driver Notification Handlers

pub(crate) mod seen;
pub(crate) mod unseen;
