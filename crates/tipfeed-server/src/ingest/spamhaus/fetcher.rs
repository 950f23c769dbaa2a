//! Spamhaus fetcher
//!
//! Downloads every drop list in [`DropListVariant::ALL`] order within one family run. Any
//! list failing fails the whole family; indicators from lists fetched before the failure are
//! discarded.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::ingest::config::SpamhausConfig;
use crate::ingest::error::Result;
use crate::ingest::fetcher::FeedFetcher;
use crate::ingest::http::{reject_markup, FeedClient};
use crate::ingest::models::{FeedFamily, Indicator};
use crate::ingest::spamhaus::parser::{DropListParser, DropListVariant};

const LIST_ACCEPT: &str = "text/plain, */*;q=0.1";

pub struct SpamhausFetcher {
    client: FeedClient,
    lists: Vec<(DropListVariant, String)>,
}

impl SpamhausFetcher {
    pub fn new(client: FeedClient, config: &SpamhausConfig) -> Self {
        let lists = DropListVariant::ALL
            .iter()
            .map(|&variant| {
                let url = match variant {
                    DropListVariant::Drop => &config.drop_url,
                    DropListVariant::Edrop => &config.edrop_url,
                    DropListVariant::DropV6 => &config.dropv6_url,
                };
                (variant, url.clone())
            })
            .collect();

        Self { client, lists }
    }
}

#[async_trait]
impl FeedFetcher for SpamhausFetcher {
    fn family(&self) -> FeedFamily {
        FeedFamily::Spamhaus
    }

    async fn fetch(&self) -> Result<Vec<Indicator>> {
        let parser = DropListParser::new();
        let mut indicators = Vec::new();

        for (variant, url) in &self.lists {
            debug!(list = %variant, url = %url, "downloading drop list");
            let body = self.client.get_text(url, LIST_ACCEPT).await?;
            reject_markup(url, &body)?;
            indicators.extend(parser.parse(&body, *variant));
        }

        info!(count = indicators.len(), lists = self.lists.len(), "fetched Spamhaus drop lists");
        Ok(indicators)
    }
}
