//! Shared HTTP client for feed downloads

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use crate::ingest::error::{FeedError, Result};

/// Thin wrapper over [`reqwest::Client`] with a fixed per-request timeout and user agent.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder().timeout(timeout).user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body as text. Non-2xx responses become [`FeedError::HttpStatus`].
    pub async fn get_text(&self, url: &str, accept: &str) -> Result<String> {
        debug!(url, "requesting feed");

        let response = self.client.get(url).header(ACCEPT, accept).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(url, bytes = body.len(), "feed downloaded");
        Ok(body)
    }
}

/// True when the payload looks like an HTML document rather than feed data.
///
/// Upstreams serve HTML block pages to rate-limited clients; parsed as a feed they would
/// silently yield nothing.
pub fn looks_like_markup(payload: &str) -> bool {
    let head: String = payload.trim_start().chars().take(16).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// [`FeedError::Format`] when `body` fetched from `url` is markup
pub fn reject_markup(url: &str, body: &str) -> Result<()> {
    if looks_like_markup(body) {
        return Err(FeedError::Format(format!(
            "received HTML instead of feed data from {url} (possible block page)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_detection() {
        assert!(looks_like_markup("  <!DOCTYPE html><html>blocked</html>"));
        assert!(looks_like_markup("\n<HTML><body>rate limited</body>"));
        assert!(!looks_like_markup("id,url\n1,http://x/"));
        assert!(!looks_like_markup("; Spamhaus DROP List"));
        assert!(!looks_like_markup(""));
    }

    #[test]
    fn test_reject_markup_is_format_error() {
        let err = reject_markup("https://feed.example/", "<!doctype html>").unwrap_err();
        assert_eq!(err.kind(), "format");
        assert!(err.to_string().contains("https://feed.example/"));
        assert!(reject_markup("https://feed.example/", "1.2.3.0/24").is_ok());
    }
}
