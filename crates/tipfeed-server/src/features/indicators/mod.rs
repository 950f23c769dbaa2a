//! Indicators feature module
//!
//! Search and aggregate counts over ingested indicators. No authentication.

pub mod queries;
pub mod routes;


pub use routes::indicators_routes;
