//! Spamhaus DROP / EDROP / DROPv6 prefix lists
//!
//! Three lists make up one family. Each list keeps its own source tag
//! (`spamhaus-drop`, `spamhaus-edrop`, `spamhaus-dropv6`) while the family's FeedRun is
//! recorded as `spamhaus`.

pub mod fetcher;
pub mod parser;

pub use fetcher::SpamhausFetcher;
pub use parser::{DropListParser, DropListVariant, DROP_LIST_TAG, SPAMHAUS_CONFIDENCE};
