//! World Bank indicators API integration.

use std::collections::BTreeMap;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::normalize::{normalize_set, RawObservation};
use crate::domain::{CountrySelection, FetchConfig, FetchFailure, Indicator, ObservationSet};
use crate::error::AppError;

/// Anything that can produce the observations of one indicator.
///
/// The HTTP client is the production implementation; tests drive the
/// pipeline with canned responses.
pub trait IndicatorSource {
    fn fetch_indicator(
        &self,
        countries: &CountrySelection,
        indicator: Indicator,
    ) -> Result<ObservationSet, AppError>;
}

pub struct WorldBankClient {
    client: Client,
    config: FetchConfig,
}

impl WorldBankClient {
    pub fn new(config: FetchConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

impl IndicatorSource for WorldBankClient {
    fn fetch_indicator(
        &self,
        countries: &CountrySelection,
        indicator: Indicator,
    ) -> Result<ObservationSet, AppError> {
        let url = indicator_url(&self.config, countries, indicator);
        debug!(%url, "requesting indicator");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::upstream(format!("Request for {indicator} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(format!(
                "Request for {indicator} failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::upstream(format!("Failed to read response for {indicator}: {e}")))?;
        let page = parse_indicator_response(&body)?;

        if page.info.pages > 1 {
            warn!(
                indicator = indicator.code(),
                pages = page.info.pages,
                total = page.info.total,
                per_page = self.config.per_page,
                "page-size ceiling truncated the result; only the first page is used"
            );
        }

        Ok(normalize_set(indicator, page.records))
    }
}

/// Request URL for one indicator over the configured date range.
pub fn indicator_url(config: &FetchConfig, countries: &CountrySelection, indicator: Indicator) -> String {
    format!(
        "{}/countries/{}/indicators/{}?date={}:{}&per_page={}&format=json",
        config.base_url.trim_end_matches('/'),
        countries.api_filter(),
        indicator.code(),
        config.date_start,
        config.date_end,
        config.per_page,
    )
}

/// Paging header (element `[0]` of a response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    pub page: u64,
    pub pages: u64,
    pub per_page: u64,
    pub total: u64,
}

impl PageInfo {
    // Older API revisions send these counters as strings.
    fn from_value(value: &Value) -> Self {
        let field = |name: &str| -> u64 {
            match value.get(name) {
                Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
                _ => 0,
            }
        };
        Self {
            page: field("page"),
            pages: field("pages"),
            per_page: field("per_page"),
            total: field("total"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorPage {
    pub info: PageInfo,
    pub records: Vec<RawObservation>,
}

/// Parse a `[page_info, records]` response body.
pub fn parse_indicator_response(body: &str) -> Result<IndicatorPage, AppError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::upstream(format!("Failed to parse response JSON: {e}")))?;

    let Value::Array(mut parts) = value else {
        return Err(AppError::upstream("Expected a JSON array response."));
    };

    if let Some(message) = parts.first().and_then(api_error_message) {
        return Err(AppError::upstream(format!("API error: {message}")));
    }

    if parts.len() != 2 {
        return Err(AppError::upstream(format!(
            "Expected a two-element response array, got {} element(s).",
            parts.len()
        )));
    }

    let records = parts.pop().unwrap_or(Value::Null);
    let info = parts.pop().map(|h| PageInfo::from_value(&h)).unwrap_or_default();

    if records.is_null() {
        return Err(AppError::upstream("Response carried no observation records."));
    }

    let records: Vec<RawObservation> = serde_json::from_value(records)
        .map_err(|e| AppError::upstream(format!("Unexpected observation record shape: {e}")))?;

    Ok(IndicatorPage { info, records })
}

fn api_error_message(header: &Value) -> Option<String> {
    let messages = header.get("message")?.as_array()?;
    let parts: Vec<String> = messages
        .iter()
        .map(|m| {
            m.get("value")
                .and_then(Value::as_str)
                .or_else(|| m.get("key").and_then(Value::as_str))
                .unwrap_or("unknown error")
                .to_string()
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Result of fetching a list of indicators, keyed by indicator.
#[derive(Debug, Clone, Default)]
pub struct FetchedIndicators {
    /// Indicators in request order.
    pub requested: Vec<Indicator>,
    pub sets: BTreeMap<Indicator, ObservationSet>,
    pub failures: Vec<FetchFailure>,
}

impl FetchedIndicators {
    pub fn get(&self, indicator: Indicator) -> Option<&ObservationSet> {
        self.sets.get(&indicator)
    }

    /// First successfully fetched set, in request order.
    pub fn first(&self) -> Option<&ObservationSet> {
        self.requested.iter().find_map(|ind| self.sets.get(ind))
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch each indicator once, in order. A failed indicator is logged and
/// recorded; the remaining indicators are still fetched.
pub fn fetch_all<S: IndicatorSource + ?Sized>(
    source: &S,
    countries: &CountrySelection,
    indicators: &[Indicator],
) -> FetchedIndicators {
    let mut out = FetchedIndicators {
        requested: indicators.to_vec(),
        ..FetchedIndicators::default()
    };

    for &indicator in indicators {
        match source.fetch_indicator(countries, indicator) {
            Ok(set) => {
                info!(
                    indicator = indicator.code(),
                    rows = set.len(),
                    "fetched {}",
                    indicator.label()
                );
                out.sets.insert(indicator, set);
            }
            Err(err) => {
                warn!(indicator = indicator.code(), reason = %err, "could not load indicator; skipping");
                out.failures.push(FetchFailure {
                    indicator,
                    reason: err.message().to_string(),
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        {"page": 1, "pages": 1, "per_page": 1000, "total": 2, "sourceid": "2", "lastupdated": "2020-07-01"},
        [
            {"indicator": {"id": "AG.LND.AGRI.ZS", "value": "Agricultural land (% of land area)"},
             "country": {"id": "BR", "value": "Brazil"}, "countryiso3code": "BRA",
             "date": "2018", "value": 28.3, "unit": "", "obs_status": "", "decimal": 1},
            {"indicator": {"id": "AG.LND.AGRI.ZS", "value": "Agricultural land (% of land area)"},
             "country": {"id": "BR", "value": "Brazil"}, "countryiso3code": "BRA",
             "date": "2017", "value": null, "unit": "", "obs_status": "", "decimal": 1}
        ]
    ]"#;

    #[test]
    fn url_joins_lowercased_codes_with_semicolons() {
        let countries = CountrySelection::from_pairs([("United States", "USA"), ("Brazil", "bra")]).unwrap();
        let url = indicator_url(&FetchConfig::default(), &countries, Indicator::AgriculturalLand);
        assert_eq!(
            url,
            "http://api.worldbank.org/v2/countries/usa;bra/indicators/AG.LND.AGRI.ZS?date=1991:2018&per_page=1000&format=json"
        );
    }

    #[test]
    fn parses_two_element_response() {
        let page = parse_indicator_response(BODY).unwrap();
        assert_eq!(page.info.pages, 1);
        assert_eq!(page.info.total, 2);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1].value, None);
    }

    #[test]
    fn string_page_counters_are_accepted() {
        let body = r#"[{"page": "1", "pages": "3", "per_page": "50", "total": "120"}, []]"#;
        let page = parse_indicator_response(body).unwrap();
        assert_eq!(page.info.pages, 3);
        assert_eq!(page.info.per_page, 50);
    }

    #[test]
    fn api_error_message_becomes_upstream_error() {
        let body = r#"[{"message": [{"id": "120", "key": "Invalid value", "value": "The provided parameter value is not valid"}]}]"#;
        let err = parse_indicator_response(body).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_UPSTREAM);
        assert!(err.message().contains("not valid"));
    }

    #[test]
    fn null_record_page_is_a_failure() {
        let body = r#"[{"page": 0, "pages": 0, "per_page": 1000, "total": 0}, null]"#;
        assert!(parse_indicator_response(body).is_err());
    }

    struct FailingOn(Indicator);

    impl IndicatorSource for FailingOn {
        fn fetch_indicator(
            &self,
            _countries: &CountrySelection,
            indicator: Indicator,
        ) -> Result<ObservationSet, AppError> {
            if indicator == self.0 {
                return Err(AppError::upstream("connection refused"));
            }
            let page = parse_indicator_response(BODY)?;
            Ok(normalize_set(indicator, page.records))
        }
    }

    #[test]
    fn failed_indicator_is_recorded_and_others_continue() {
        let countries = CountrySelection::default();
        let fetched = fetch_all(&FailingOn(Indicator::ForestArea), &countries, &Indicator::ALL);
        assert_eq!(fetched.sets.len(), 6);
        assert!(fetched.get(Indicator::ForestArea).is_none());
        assert_eq!(fetched.failures.len(), 1);
        assert_eq!(fetched.failures[0].indicator, Indicator::ForestArea);
        assert_eq!(fetched.failures[0].reason, "connection refused");
        assert_eq!(fetched.first().unwrap().indicator, Indicator::AgriculturalLand);
    }

    #[test]
    fn first_skips_failed_leading_indicator() {
        let countries = CountrySelection::default();
        let fetched = fetch_all(&FailingOn(Indicator::AgriculturalLand), &countries, &Indicator::ALL);
        assert_eq!(fetched.first().unwrap().indicator, Indicator::ForestArea);
        assert!(!fetched.is_complete());
    }
}
