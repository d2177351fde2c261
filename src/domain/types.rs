//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - filled from World Bank API responses
//! - reshaped by the chart builders
//! - exported to JSON for a rendering layer (plotly figure shape)

use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://api.worldbank.org/v2";
pub const DEFAULT_DATE_START: i32 = 1991;
pub const DEFAULT_DATE_END: i32 = 2018;
pub const DEFAULT_PER_PAGE: usize = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Countries plotted when the caller does not supply a selection.
pub const DEFAULT_COUNTRIES: [(&str, &str); 8] = [
    ("Canada", "CAN"),
    ("United States", "USA"),
    ("Mexico", "MEX"),
    ("Brazil", "BRA"),
    ("France", "FRA"),
    ("Italy", "ITA"),
    ("Germany", "DEU"),
    ("United Kingdom", "GBR"),
];

/// One World Development Indicators series.
///
/// Declaration order is request order; the derived `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "AG.LND.AGRI.ZS")]
    AgriculturalLand,
    #[serde(rename = "AG.LND.FRST.ZS")]
    ForestArea,
    #[serde(rename = "ER.PTD.TOTL.ZS")]
    ProtectedAreas,
    #[serde(rename = "EN.ATM.CO2E.PC")]
    Co2PerCapita,
    #[serde(rename = "EG.USE.ELEC.KH.PC")]
    ElectricPowerConsumption,
    #[serde(rename = "EG.FEC.RNEW.ZS")]
    RenewableEnergyShare,
    #[serde(rename = "SP.URB.TOTL.IN.ZS")]
    UrbanPopulation,
}

impl Indicator {
    pub const ALL: [Indicator; 7] = [
        Indicator::AgriculturalLand,
        Indicator::ForestArea,
        Indicator::ProtectedAreas,
        Indicator::Co2PerCapita,
        Indicator::ElectricPowerConsumption,
        Indicator::RenewableEnergyShare,
        Indicator::UrbanPopulation,
    ];

    /// API series code.
    pub fn code(self) -> &'static str {
        match self {
            Indicator::AgriculturalLand => "AG.LND.AGRI.ZS",
            Indicator::ForestArea => "AG.LND.FRST.ZS",
            Indicator::ProtectedAreas => "ER.PTD.TOTL.ZS",
            Indicator::Co2PerCapita => "EN.ATM.CO2E.PC",
            Indicator::ElectricPowerConsumption => "EG.USE.ELEC.KH.PC",
            Indicator::RenewableEnergyShare => "EG.FEC.RNEW.ZS",
            Indicator::UrbanPopulation => "SP.URB.TOTL.IN.ZS",
        }
    }

    /// Short human-readable label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::AgriculturalLand => "agricultural land",
            Indicator::ForestArea => "forest area",
            Indicator::ProtectedAreas => "protected areas",
            Indicator::Co2PerCapita => "CO2 per capita",
            Indicator::ElectricPowerConsumption => "electric power consumption",
            Indicator::RenewableEnergyShare => "renewable energy share",
            Indicator::UrbanPopulation => "urban population",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Indicator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Indicator::ALL
            .into_iter()
            .find(|ind| ind.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::config(format!("Unknown indicator code '{s}'.")))
    }
}

/// A selected country: display name plus ISO-3 code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
}

/// Ordered set of countries to request.
///
/// Order is the caller's order; codes are unique (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySelection {
    countries: Vec<Country>,
}

impl CountrySelection {
    /// Build a selection from `(display name, ISO-3 code)` pairs.
    ///
    /// An empty input yields the default selection.
    pub fn from_pairs<I, N, C>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let mut countries = Vec::new();
        let mut seen = HashSet::new();
        for (name, code) in pairs {
            let name = name.into().trim().to_string();
            let code = code.into().trim().to_uppercase();
            if code.is_empty() {
                return Err(AppError::config(format!("Country '{name}' has an empty ISO-3 code.")));
            }
            if !seen.insert(code.clone()) {
                return Err(AppError::config(format!("Duplicate country code '{code}'.")));
            }
            countries.push(Country { name, code });
        }

        if countries.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { countries })
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Path segment for the API: lowercased codes joined by `;`.
    pub fn api_filter(&self) -> String {
        self.countries
            .iter()
            .map(|c| c.code.to_lowercase())
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl Default for CountrySelection {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES
                .iter()
                .map(|(name, code)| Country {
                    name: name.to_string(),
                    code: code.to_string(),
                })
                .collect(),
        }
    }
}

/// A normalized observation: one (country, year, value) of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub country: String,
    pub indicator: String,
    /// Four-digit year.
    pub date: String,
    /// `None` for years the source has no data for.
    pub value: Option<f64>,
}

/// All observations returned for one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    pub indicator: Indicator,
    pub observations: Vec<Observation>,
}

impl ObservationSet {
    pub fn new(indicator: Indicator, observations: Vec<Observation>) -> Self {
        Self {
            indicator,
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct country labels in first-seen order.
    pub fn countries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.observations
            .iter()
            .filter(|o| seen.insert(o.country.as_str()))
            .map(|o| o.country.clone())
            .collect()
    }

    /// Earliest and latest year present.
    pub fn year_span(&self) -> Option<(&str, &str)> {
        let first = self.observations.iter().map(|o| o.date.as_str()).min()?;
        let last = self.observations.iter().map(|o| o.date.as_str()).max()?;
        Some((first, last))
    }
}

/// Why an indicator is absent from a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub indicator: Indicator,
    pub reason: String,
}

/// What to do when an indicator could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    /// Omit only the charts that need the missing indicator.
    #[default]
    SkipChart,
    /// Abort the whole run on the first missing indicator.
    FailFast,
}

/// Remote source settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub date_start: i32,
    pub date_end: i32,
    /// Page-size ceiling; results beyond the first page are not requested.
    pub per_page: usize,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            date_start: DEFAULT_DATE_START,
            date_end: DEFAULT_DATE_END,
            per_page: DEFAULT_PER_PAGE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub countries: CountrySelection,
    pub fetch: FetchConfig,
    pub missing: MissingPolicy,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    /// Print the dashboard JSON to stdout instead of the text summary.
    pub json: bool,
    pub export: Option<PathBuf>,
    pub debug: bool,
}

/// The six dashboard charts, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    LandUse,
    ForestArea,
    ProtectedAreas,
    EmissionsPerCapita,
    ElectricityVsUrban,
    Co2VsRenewables,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::LandUse,
        ChartKind::ForestArea,
        ChartKind::ProtectedAreas,
        ChartKind::EmissionsPerCapita,
        ChartKind::ElectricityVsUrban,
        ChartKind::Co2VsRenewables,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::LandUse => "Agricultural Land (% of land area)",
            ChartKind::ForestArea => "Forest Area (% of land area)",
            ChartKind::ProtectedAreas => "Terrestrial and Marine Protected Areas in 2018",
            ChartKind::EmissionsPerCapita => "CO2 Emissions per Capita",
            ChartKind::ElectricityVsUrban => {
                "Electric Power Consumption vs Percent of Urban Population"
            }
            ChartKind::Co2VsRenewables => "Renewable Energy Consumption vs CO2 Emissions in 2000",
        }
    }

    /// Indicators the chart reads. For joins: `[x-axis, y-axis]`.
    pub fn inputs(self) -> &'static [Indicator] {
        match self {
            ChartKind::LandUse => &[Indicator::AgriculturalLand],
            ChartKind::ForestArea => &[Indicator::ForestArea],
            ChartKind::ProtectedAreas => &[Indicator::ProtectedAreas],
            ChartKind::EmissionsPerCapita => &[Indicator::Co2PerCapita],
            ChartKind::ElectricityVsUrban => &[
                Indicator::UrbanPopulation,
                Indicator::ElectricPowerConsumption,
            ],
            ChartKind::Co2VsRenewables => &[
                Indicator::Co2PerCapita,
                Indicator::RenewableEnergyShare,
            ],
        }
    }
}

/// A chart omitted because one of its inputs was not fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedChart {
    pub chart: ChartKind,
    pub missing: Vec<Indicator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

/// X-axis values: category labels (years, countries) or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValues {
    Labels(Vec<String>),
    Numbers(Vec<Option<f64>>),
}

impl AxisValues {
    pub fn len(&self) -> usize {
        match self {
            AxisValues::Labels(v) => v.len(),
            AxisValues::Numbers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub size: f64,
}

/// One trace of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub x: AxisValues,
    pub y: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<TraceMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autotick: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

/// A chart ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub chart: ChartKind,
    pub data: Vec<Series>,
    pub layout: Layout,
}

impl ChartPayload {
    pub fn point_count(&self) -> usize {
        self.data.iter().map(|s| s.y.len()).sum()
    }
}

/// A saved dashboard file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub countries: Vec<Country>,
    pub charts: Vec<ChartPayload>,
    #[serde(default)]
    pub skipped: Vec<SkippedChart>,
    #[serde(default)]
    pub failures: Vec<FetchFailure>,
}
