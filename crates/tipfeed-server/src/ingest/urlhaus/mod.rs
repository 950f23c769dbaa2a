//! URLhaus (abuse.ch) URL-list feed
//!
//! - Download: `csv_recent`, falling back to `text_recent` when the table is empty
//! - Parse: [`UrlhausParser`]
//! - Family: [`crate::ingest::models::FeedFamily::Urlhaus`], source tag `urlhaus`

pub mod fetcher;
pub mod parser;

pub use fetcher::UrlhausFetcher;
pub use parser::{UrlhausParser, URLHAUS_CONFIDENCE, URLHAUS_SOURCE};
