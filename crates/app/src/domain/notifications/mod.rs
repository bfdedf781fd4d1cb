//! Notifications

pub mod errors;
mod repository;
pub mod service;

pub use errors::NotificationsServiceError;
pub use service::*;
