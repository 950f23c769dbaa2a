//! Feeds feature module
//!
//! Feed run history and manual ingestion triggers.

pub mod commands;
pub mod queries;
pub mod routes;

#[cfg(test)]
mod routes_test;

pub use routes::feeds_routes;
