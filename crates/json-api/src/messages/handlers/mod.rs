//! Message Handlers

pub(crate) mod index;
pub(crate) mod read;
pub(crate) mod send;
pub(crate) mod typing;
pub(crate) mod unread;
