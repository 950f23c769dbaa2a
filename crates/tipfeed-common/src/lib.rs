//! tipfeed common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the tipfeed workspace members:
//!
//! - **Error Handling**: [`TipError`] and the crate-wide [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by `LOG_*` environment variables
//! - **Time**: the canonical UTC timestamp format used for every stored indicator and run
//!
//! # Example
//!
//! ```no_run
//! use tipfeed_common::logging::{init_logging, LogConfig};
//! use tipfeed_common::time::utc_now_iso;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!(now = %utc_now_iso(), "started");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod time;

pub use error::{Result, TipError};
