//! Sessions

pub mod errors;
pub mod records;
mod repository;
pub mod service;
pub mod token;

pub use errors::SessionsServiceError;
pub use service::*;
