//! Feed commands

pub mod run_feeds;

pub use run_feeds::{RunFeedsCommand, RunFeedsError};
