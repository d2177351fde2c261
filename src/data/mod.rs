//! Remote data access: the World Bank client and record normalization.

pub mod normalize;
pub mod worldbank;

pub use normalize::{normalize, normalize_set, Label, RawObservation};
pub use worldbank::{
    fetch_all, indicator_url, parse_indicator_response, FetchedIndicators, IndicatorSource, WorldBankClient,
};
