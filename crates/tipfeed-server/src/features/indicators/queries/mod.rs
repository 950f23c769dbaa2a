//! Indicator queries

pub mod get_stats;
pub mod search_indicators;

pub use get_stats::{GetIndicatorStatsError, GetIndicatorStatsQuery, IndicatorStatsResponse};
pub use search_indicators::{SearchIndicatorsError, SearchIndicatorsQuery};
