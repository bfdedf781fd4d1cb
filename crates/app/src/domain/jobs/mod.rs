//! Jobs

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod state;
pub mod tracking;

pub use errors::JobsServiceError;
pub use service::*;
