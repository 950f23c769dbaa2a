//! Feed run queries

pub mod list_runs;

pub use list_runs::{ListFeedRunsError, ListFeedRunsQuery};
