//! Assignment Handlers

pub(crate) mod accept;
pub(crate) mod active;
