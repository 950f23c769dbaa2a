//! Search indicators query

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::ingest::models::{Indicator, IndicatorType};
use crate::ingest::store::{IndicatorFilter, IndicatorStore, DEFAULT_SEARCH_LIMIT};

/// Query to search indicators
///
/// Blank parameters are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchIndicatorsQuery {
    /// Substring of the indicator value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Exact indicator type (`url`, `ip`, `domain`, `cidr`)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub indicator_type: Option<String>,
    /// Exact source tag, e.g. `spamhaus-drop`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Defaults to 50, clamped to 1..=1000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Error type for search indicators query
#[derive(Debug, thiserror::Error)]
pub enum SearchIndicatorsError {
    #[error("Invalid type filter: {0}")]
    InvalidType(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<Indicator>, SearchIndicatorsError>> for SearchIndicatorsQuery {}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl SearchIndicatorsQuery {
    pub fn into_filter(self) -> Result<IndicatorFilter, SearchIndicatorsError> {
        let indicator_type = non_blank(self.indicator_type)
            .map(|t| {
                t.parse::<IndicatorType>()
                    .map_err(|_| SearchIndicatorsError::InvalidType(t))
            })
            .transpose()?;

        Ok(IndicatorFilter {
            q: non_blank(self.q),
            indicator_type,
            source: non_blank(self.source),
            limit: self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        })
    }
}

pub async fn handle(
    store: &IndicatorStore,
    query: SearchIndicatorsQuery,
) -> Result<Vec<Indicator>, SearchIndicatorsError> {
    let filter = query.into_filter()?;
    Ok(store.search(&filter).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_params_become_absent() {
        let query = SearchIndicatorsQuery {
            q: Some("  ".into()),
            indicator_type: Some(String::new()),
            source: Some(" urlhaus ".into()),
            limit: None,
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.q, None);
        assert_eq!(filter.indicator_type, None);
        assert_eq!(filter.source.as_deref(), Some("urlhaus"));
        assert_eq!(filter.limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let query = SearchIndicatorsQuery {
            indicator_type: Some("hash".into()),
            ..Default::default()
        };
        let err = query.into_filter().unwrap_err();
        assert!(matches!(err, SearchIndicatorsError::InvalidType(t) if t == "hash"));
    }
}
