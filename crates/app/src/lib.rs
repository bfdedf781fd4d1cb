//! Job coordination domain, persistence and realtime modules.

pub mod client;
pub mod context;
pub mod database;
pub mod domain;
pub mod realtime;
pub mod session;
pub mod uuids;

#[cfg(test)]
mod test;

mod tokens;
