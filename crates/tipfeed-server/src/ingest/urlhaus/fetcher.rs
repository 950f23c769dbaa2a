//! URLhaus fetcher
//!
//! Tries the tabular endpoint first. When the table parses to nothing, a second request goes to
//! the plain-text endpoint. An HTML block page on either endpoint is an error, never an empty
//! result.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::ingest::config::UrlhausConfig;
use crate::ingest::error::Result;
use crate::ingest::fetcher::FeedFetcher;
use crate::ingest::http::{reject_markup, FeedClient};
use crate::ingest::models::{FeedFamily, Indicator};
use crate::ingest::urlhaus::parser::UrlhausParser;

const CSV_ACCEPT: &str = "text/csv, text/plain;q=0.9, */*;q=0.1";
const TEXT_ACCEPT: &str = "text/plain, */*;q=0.1";

pub struct UrlhausFetcher {
    client: FeedClient,
    csv_url: String,
    text_url: String,
}

impl UrlhausFetcher {
    pub fn new(client: FeedClient, config: &UrlhausConfig) -> Self {
        Self {
            client,
            csv_url: config.csv_url.clone(),
            text_url: config.text_url.clone(),
        }
    }
}

#[async_trait]
impl FeedFetcher for UrlhausFetcher {
    fn family(&self) -> FeedFamily {
        FeedFamily::Urlhaus
    }

    async fn fetch(&self) -> Result<Vec<Indicator>> {
        // One observation time per fetch so undated rows share a timestamp
        let parser = UrlhausParser::new();

        let body = self.client.get_text(&self.csv_url, CSV_ACCEPT).await?;
        reject_markup(&self.csv_url, &body)?;

        let indicators = parser.parse_csv(&body)?;
        if !indicators.is_empty() {
            info!(count = indicators.len(), "fetched URLhaus CSV");
            return Ok(indicators);
        }

        debug!(url = %self.text_url, "URLhaus CSV yielded no rows, falling back to text list");
        let body = self.client.get_text(&self.text_url, TEXT_ACCEPT).await?;
        reject_markup(&self.text_url, &body)?;

        let indicators = parser.parse_text(&body);
        info!(count = indicators.len(), "fetched URLhaus text list");
        Ok(indicators)
    }
}
