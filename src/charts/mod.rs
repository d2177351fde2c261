//! Chart preparation: reshaping helpers (`table`) and the six builders.

pub mod builders;
pub mod table;

pub use builders::*;
pub use table::{country_order, filter_years, inner_join, JoinedRow};

use crate::data::FetchedIndicators;
use crate::domain::{ChartKind, ChartPayload, SkippedChart};

/// Build one chart from the fetched sets, or report which inputs are missing.
pub fn build_chart(
    chart: ChartKind,
    fetched: &FetchedIndicators,
    countries: &[String],
) -> Result<ChartPayload, SkippedChart> {
    let missing: Vec<_> = chart
        .inputs()
        .iter()
        .copied()
        .filter(|ind| fetched.get(*ind).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(SkippedChart { chart, missing });
    }

    let inputs: Vec<_> = chart.inputs().iter().filter_map(|ind| fetched.get(*ind)).collect();

    let payload = match (chart, inputs.as_slice()) {
        (ChartKind::LandUse, [set]) => land_use_chart(set, countries),
        (ChartKind::ForestArea, [set]) => forest_area_chart(set, countries),
        (ChartKind::ProtectedAreas, [set]) => protected_area_chart(set),
        (ChartKind::EmissionsPerCapita, [set]) => emissions_chart(set, countries),
        (ChartKind::ElectricityVsUrban, [urban, electricity]) => {
            electricity_vs_urban_chart(urban, electricity, countries)
        }
        (ChartKind::Co2VsRenewables, [co2, renewables]) => co2_vs_renewables_chart(co2, renewables, countries),
        _ => {
            return Err(SkippedChart {
                chart,
                missing: chart.inputs().to_vec(),
            });
        }
    };

    Ok(payload)
}
