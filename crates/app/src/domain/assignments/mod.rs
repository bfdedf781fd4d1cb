//! Assignments

pub(crate) mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::{AssignmentsServiceError, JOB_ALREADY_TAKEN};
pub use service::*;
