//! Fetcher seam between the coordinator and the upstream feeds

use async_trait::async_trait;

use crate::ingest::error::Result;
use crate::ingest::models::{FeedFamily, Indicator};

/// Retrieves one feed family's current payload and returns it as normalized indicators.
///
/// Implementations own retrieval and parsing only; persistence and run bookkeeping belong to
/// [`crate::ingest::coordinator::IngestionCoordinator`].
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Family this fetcher serves, used as the FeedRun source
    fn family(&self) -> FeedFamily;

    async fn fetch(&self) -> Result<Vec<Indicator>>;
}
