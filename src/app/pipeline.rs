//! Shared dashboard pipeline used by the CLI front-end.
//!
//! fetch -> normalize -> country order -> six chart builders
//!
//! Observation sets are looked up by indicator, never by position, so a
//! failed fetch can only affect the charts that read that indicator.

use chrono::Utc;
use tracing::{info, warn};

use crate::charts::{build_chart, country_order};
use crate::data::{fetch_all, FetchedIndicators, IndicatorSource, WorldBankClient};
use crate::domain::{
    ChartKind, ChartPayload, CountrySelection, Dashboard, Indicator, MissingPolicy, RunConfig, SkippedChart,
};
use crate::error::AppError;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub countries: CountrySelection,
    pub fetched: FetchedIndicators,
    /// Legend order shared by every chart.
    pub country_order: Vec<String>,
    pub charts: Vec<ChartPayload>,
    pub skipped: Vec<SkippedChart>,
}

impl RunOutput {
    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            tool: "wdi".to_string(),
            generated_at: Utc::now(),
            countries: self.countries.countries().to_vec(),
            charts: self.charts.clone(),
            skipped: self.skipped.clone(),
            failures: self.fetched.failures.clone(),
        }
    }
}

/// Fetch from the World Bank API and build the dashboard.
pub fn run_dashboard(config: &RunConfig) -> Result<RunOutput, AppError> {
    let client = WorldBankClient::new(config.fetch.clone())?;
    run_with_source(&client, &config.countries, config.missing)
}

/// Execute the pipeline against any indicator source.
pub fn run_with_source<S: IndicatorSource + ?Sized>(
    source: &S,
    countries: &CountrySelection,
    missing: MissingPolicy,
) -> Result<RunOutput, AppError> {
    let fetched = fetch_all(source, countries, &Indicator::ALL);

    if missing == MissingPolicy::FailFast {
        if let Some(failure) = fetched.failures.first() {
            return Err(AppError::pipeline(format!(
                "Indicator {} could not be loaded: {}",
                failure.indicator, failure.reason
            )));
        }
    }

    let Some(first) = fetched.first() else {
        return Err(AppError::pipeline("No indicator could be loaded; nothing to chart."));
    };
    let order = country_order(first);

    let (charts, skipped) = build_charts(&fetched, &order);
    info!(charts = charts.len(), skipped = skipped.len(), "dashboard built");

    Ok(RunOutput {
        countries: countries.clone(),
        fetched,
        country_order: order,
        charts,
        skipped,
    })
}

/// Build every chart whose inputs were fetched, in dashboard order.
pub fn build_charts(fetched: &FetchedIndicators, order: &[String]) -> (Vec<ChartPayload>, Vec<SkippedChart>) {
    let mut charts = Vec::with_capacity(ChartKind::ALL.len());
    let mut skipped = Vec::new();

    for chart in ChartKind::ALL {
        match build_chart(chart, fetched, order) {
            Ok(payload) => charts.push(payload),
            Err(skip) => {
                let missing: Vec<&str> = skip.missing.iter().map(|i| i.code()).collect();
                warn!(chart = chart.title(), missing = ?missing, "skipping chart with missing input");
                skipped.push(skip);
            }
        }
    }

    (charts, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{normalize_set, parse_indicator_response};
    use crate::domain::{Indicator, ObservationSet};

    /// Serves canned API bodies for every indicator, covering each requested
    /// country for 1991..=2018, except for indicators listed in `fail`.
    struct FixtureSource {
        fail: Vec<Indicator>,
    }

    fn body_for(countries: &CountrySelection, indicator: Indicator) -> String {
        let mut records = Vec::new();
        // API order: newest year first.
        for year in (1991..=2018).rev() {
            for (i, c) in countries.countries().iter().enumerate() {
                let value = 60.0 + i as f64 * 10.0 + (year - 1991) as f64 * 0.5;
                records.push(serde_json::json!({
                    "indicator": {"id": indicator.code(), "value": indicator.label()},
                    "country": {"id": &c.code[..2], "value": c.name},
                    "countryiso3code": c.code,
                    "date": year.to_string(),
                    "value": value,
                    "unit": "",
                    "obs_status": "",
                    "decimal": 1
                }));
            }
        }
        let total = records.len();
        serde_json::json!([
            {"page": 1, "pages": 1, "per_page": 1000, "total": total},
            records
        ])
        .to_string()
    }

    impl IndicatorSource for FixtureSource {
        fn fetch_indicator(
            &self,
            countries: &CountrySelection,
            indicator: Indicator,
        ) -> Result<ObservationSet, AppError> {
            if self.fail.contains(&indicator) {
                return Err(AppError::upstream("timed out"));
            }
            let page = parse_indicator_response(&body_for(countries, indicator))?;
            Ok(normalize_set(indicator, page.records))
        }
    }

    fn two_countries() -> CountrySelection {
        CountrySelection::from_pairs([("Canada", "CAN"), ("Brazil", "BRA")]).unwrap()
    }

    #[test]
    fn end_to_end_builds_six_charts() {
        let source = FixtureSource { fail: vec![] };
        let run = run_with_source(&source, &two_countries(), MissingPolicy::SkipChart).unwrap();

        assert_eq!(run.charts.len(), 6);
        assert!(run.skipped.is_empty());
        let kinds: Vec<ChartKind> = run.charts.iter().map(|c| c.chart).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());

        for chart in &run.charts {
            assert_eq!(chart.data.len(), 2, "{}", chart.layout.title);
        }
        // Yearly charts carry every year; snapshot charts carry four.
        assert_eq!(run.charts[0].data[0].y.len(), 28);
        assert_eq!(run.charts[3].data[0].y.len(), 4);
        assert_eq!(run.charts[4].data[0].y.len(), 4);
        assert_eq!(run.charts[5].data[0].y.len(), 4);
    }

    #[test]
    fn legend_order_is_shared_across_charts() {
        let source = FixtureSource { fail: vec![] };
        let run = run_with_source(&source, &two_countries(), MissingPolicy::SkipChart).unwrap();

        // Brazil has the higher 1991 value in the fixture.
        assert_eq!(run.country_order, vec!["Brazil".to_string(), "Canada".to_string()]);
        for chart in run.charts.iter().filter(|c| c.chart != ChartKind::ProtectedAreas) {
            let names: Vec<String> = chart.data.iter().filter_map(|s| s.name.clone()).collect();
            assert_eq!(names, run.country_order);
        }
    }

    #[test]
    fn missing_indicator_skips_only_dependent_charts() {
        let source = FixtureSource {
            fail: vec![Indicator::RenewableEnergyShare],
        };
        let run = run_with_source(&source, &two_countries(), MissingPolicy::SkipChart).unwrap();

        assert_eq!(run.charts.len(), 5);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].chart, ChartKind::Co2VsRenewables);
        assert_eq!(run.skipped[0].missing, vec![Indicator::RenewableEnergyShare]);
        assert_eq!(run.dashboard().failures.len(), 1);
    }

    #[test]
    fn fail_fast_aborts_on_any_missing_indicator() {
        let source = FixtureSource {
            fail: vec![Indicator::ForestArea],
        };
        let err = run_with_source(&source, &two_countries(), MissingPolicy::FailFast).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_PIPELINE);
        assert!(err.message().contains("AG.LND.FRST.ZS"));
    }

    #[test]
    fn nothing_fetched_is_an_error() {
        let source = FixtureSource {
            fail: Indicator::ALL.to_vec(),
        };
        assert!(run_with_source(&source, &two_countries(), MissingPolicy::SkipChart).is_err());
    }
}
