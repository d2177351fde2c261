//! The six dashboard chart builders.
//!
//! Each builder is a pure function over normalized observation sets plus the
//! shared country order. Countries with no rows still get an (empty) series
//! so every chart carries the same legend.

use crate::charts::table::{filter_years, inner_join, rows_for, sort_by_value_desc, sort_chronological, JoinedRow};
use crate::domain::{
    Axis, AxisValues, ChartKind, ChartPayload, Layout, Marker, Observation, ObservationSet, Series, TraceKind,
    TraceMode,
};

/// Years plotted by the snapshot charts.
pub const SNAPSHOT_YEARS: [&str; 4] = ["1991", "2000", "2009", "2018"];

/// The single year shown by the protected-area bar chart.
pub const PROTECTED_AREA_YEAR: &str = "2018";

const EMISSIONS_MARKER_SIZE: f64 = 12.0;
const CO2_RENEWABLES_MARKER_SIZE: f64 = 8.0;
const POINT_TEXT_POSITION: &str = "top center";

fn year_axis() -> Axis {
    Axis {
        title: "Year".to_string(),
        autotick: Some(false),
        tick0: Some(1991.0),
        dtick: Some(9.0),
        range: None,
    }
}

fn titled_axis(title: &str) -> Axis {
    Axis {
        title: title.to_string(),
        ..Axis::default()
    }
}

fn layout(chart: ChartKind, xaxis: Axis, yaxis: Axis) -> Layout {
    Layout {
        title: chart.title().to_string(),
        xaxis,
        yaxis,
        hovermode: None,
        hovertemplate: None,
        showlegend: None,
    }
}

/// One year-indexed series per country, chronological.
fn yearly_series(rows: &[Observation], countries: &[String], mode: TraceMode, marker: Option<Marker>) -> Vec<Series> {
    countries
        .iter()
        .map(|country| {
            let (x, y): (Vec<String>, Vec<Option<f64>>) =
                rows_for(rows, country).map(|o| (o.date.clone(), o.value)).unzip();
            Series {
                kind: TraceKind::Scatter,
                x: AxisValues::Labels(x),
                y,
                mode: Some(mode),
                name: Some(country.clone()),
                text: None,
                textposition: None,
                marker,
            }
        })
        .collect()
}

/// Join, restrict to snapshot years, order by year.
fn joined_snapshot_rows(left: &ObservationSet, right: &ObservationSet) -> Vec<JoinedRow> {
    let mut rows: Vec<JoinedRow> = inner_join(&left.observations, &right.observations)
        .into_iter()
        .filter(|r| SNAPSHOT_YEARS.contains(&r.date.as_str()))
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    rows
}

/// One labelled x/y series per country over joined rows.
fn joined_series(rows: &[JoinedRow], countries: &[String], mode: TraceMode, marker: Option<Marker>) -> Vec<Series> {
    countries
        .iter()
        .map(|country| {
            let mine: Vec<&JoinedRow> = rows.iter().filter(|r| &r.country == country).collect();
            Series {
                kind: TraceKind::Scatter,
                x: AxisValues::Numbers(mine.iter().map(|r| r.x).collect()),
                y: mine.iter().map(|r| r.y).collect(),
                mode: Some(mode),
                name: Some(country.clone()),
                text: Some(mine.iter().map(|r| format!("{} {}", r.country, r.date)).collect()),
                textposition: Some(POINT_TEXT_POSITION.to_string()),
                marker,
            }
        })
        .collect()
}

/// Agricultural land share over time, one line per country.
pub fn land_use_chart(set: &ObservationSet, countries: &[String]) -> ChartPayload {
    let mut rows = set.observations.clone();
    sort_chronological(&mut rows);

    ChartPayload {
        chart: ChartKind::LandUse,
        data: yearly_series(&rows, countries, TraceMode::Lines, None),
        layout: layout(ChartKind::LandUse, year_axis(), titled_axis("Percent of land area")),
    }
}

/// Forest area share over time as markers, hover unified by year.
pub fn forest_area_chart(set: &ObservationSet, countries: &[String]) -> ChartPayload {
    let mut rows = set.observations.clone();
    sort_chronological(&mut rows);

    let mut layout = layout(ChartKind::ForestArea, year_axis(), titled_axis("Percent of land area"));
    layout.hovermode = Some("x unified".to_string());

    ChartPayload {
        chart: ChartKind::ForestArea,
        data: yearly_series(&rows, countries, TraceMode::Markers, None),
        layout,
    }
}

/// Protected areas in a single year: one bar per country, largest first.
pub fn protected_area_chart(set: &ObservationSet) -> ChartPayload {
    let mut rows = set.observations.clone();
    sort_by_value_desc(&mut rows);
    let rows = filter_years(&rows, &[PROTECTED_AREA_YEAR]);

    let data = rows
        .into_iter()
        .map(|o| Series {
            kind: TraceKind::Bar,
            x: AxisValues::Labels(vec![o.country.clone()]),
            y: vec![o.value],
            mode: None,
            name: Some(o.country),
            text: None,
            textposition: None,
            marker: None,
        })
        .collect();

    let mut layout = layout(
        ChartKind::ProtectedAreas,
        titled_axis("Country"),
        titled_axis("Percent of total territorial area"),
    );
    layout.hovertemplate = Some("<extra></extra>".to_string());
    layout.showlegend = Some(false);

    ChartPayload {
        chart: ChartKind::ProtectedAreas,
        data,
        layout,
    }
}

/// CO2 per capita at the snapshot years.
pub fn emissions_chart(set: &ObservationSet, countries: &[String]) -> ChartPayload {
    let rows = filter_years(&set.observations, &SNAPSHOT_YEARS);
    let marker = Some(Marker {
        size: EMISSIONS_MARKER_SIZE,
    });

    ChartPayload {
        chart: ChartKind::EmissionsPerCapita,
        data: yearly_series(&rows, countries, TraceMode::Markers, marker),
        layout: layout(ChartKind::EmissionsPerCapita, year_axis(), titled_axis("Metric tons per capita")),
    }
}

/// Electricity use (y) against urban population share (x).
pub fn electricity_vs_urban_chart(
    urban: &ObservationSet,
    electricity: &ObservationSet,
    countries: &[String],
) -> ChartPayload {
    let rows = joined_snapshot_rows(urban, electricity);

    let xaxis = Axis {
        title: "Urban population (% of total population)".to_string(),
        range: Some([60.0, 90.0]),
        dtick: Some(5.0),
        ..Axis::default()
    };

    ChartPayload {
        chart: ChartKind::ElectricityVsUrban,
        data: joined_series(&rows, countries, TraceMode::LinesMarkers, None),
        layout: layout(
            ChartKind::ElectricityVsUrban,
            xaxis,
            titled_axis("Electric power consumption (kWh per capita)"),
        ),
    }
}

/// Renewable share (y) against CO2 per capita (x).
pub fn co2_vs_renewables_chart(co2: &ObservationSet, renewables: &ObservationSet, countries: &[String]) -> ChartPayload {
    let rows = joined_snapshot_rows(co2, renewables);
    let marker = Some(Marker {
        size: CO2_RENEWABLES_MARKER_SIZE,
    });

    ChartPayload {
        chart: ChartKind::Co2VsRenewables,
        data: joined_series(&rows, countries, TraceMode::Markers, marker),
        layout: layout(
            ChartKind::Co2VsRenewables,
            titled_axis("CO2 emissions (metric tons per capita)"),
            titled_axis("Renewable energy (% of total energy consumption)"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::table::tests::obs;
    use crate::domain::Indicator;

    fn set(indicator: Indicator, rows: Vec<Observation>) -> ObservationSet {
        ObservationSet::new(indicator, rows)
    }

    fn names(chart: &ChartPayload) -> Vec<String> {
        chart.data.iter().filter_map(|s| s.name.clone()).collect()
    }

    #[test]
    fn land_use_series_are_chronological_per_country() {
        let s = set(
            Indicator::AgriculturalLand,
            vec![
                obs("A", "2018", Some(3.0)),
                obs("B", "2018", Some(9.0)),
                obs("A", "1991", Some(5.0)),
                obs("B", "1991", Some(8.0)),
            ],
        );
        let countries = vec!["B".to_string(), "A".to_string()];
        let chart = land_use_chart(&s, &countries);

        assert_eq!(names(&chart), countries);
        assert_eq!(chart.data[1].x, AxisValues::Labels(vec!["1991".into(), "2018".into()]));
        assert_eq!(chart.data[1].y, vec![Some(5.0), Some(3.0)]);
        assert_eq!(chart.data[0].mode, Some(TraceMode::Lines));
        assert_eq!(chart.layout.xaxis.dtick, Some(9.0));
    }

    #[test]
    fn forest_chart_uses_markers_and_unified_hover() {
        let s = set(Indicator::ForestArea, vec![obs("A", "2000", Some(1.0))]);
        let chart = forest_area_chart(&s, &["A".to_string(), "Z".to_string()]);
        assert_eq!(chart.data.len(), 2);
        assert!(chart.data[1].y.is_empty());
        assert_eq!(chart.data[0].mode, Some(TraceMode::Markers));
        assert_eq!(chart.layout.hovermode.as_deref(), Some("x unified"));
    }

    #[test]
    fn protected_chart_keeps_one_year_sorted_descending() {
        let s = set(
            Indicator::ProtectedAreas,
            vec![obs("A", "2018", Some(10.0)), obs("B", "2018", Some(30.0)), obs("C", "2017", Some(20.0))],
        );
        let chart = protected_area_chart(&s);
        assert_eq!(names(&chart), vec!["B".to_string(), "A".to_string()]);
        assert!(chart.data.iter().all(|s| s.kind == TraceKind::Bar && s.y.len() == 1));
        assert_eq!(chart.data[0].y, vec![Some(30.0)]);
        assert_eq!(chart.layout.showlegend, Some(false));
        assert_eq!(chart.layout.hovertemplate.as_deref(), Some("<extra></extra>"));
    }

    #[test]
    fn emissions_chart_plots_only_snapshot_years() {
        let rows = ["1991", "1995", "2000", "2009", "2018", "2020"]
            .iter()
            .map(|y| obs("A", y, Some(2.0)))
            .collect();
        let chart = emissions_chart(&set(Indicator::Co2PerCapita, rows), &["A".to_string()]);
        assert_eq!(
            chart.data[0].x,
            AxisValues::Labels(SNAPSHOT_YEARS.iter().map(|y| y.to_string()).collect())
        );
        assert_eq!(chart.data[0].marker, Some(Marker { size: 12.0 }));
    }

    #[test]
    fn join_charts_never_plot_unmatched_keys() {
        let urban = set(
            Indicator::UrbanPopulation,
            vec![
                obs("A", "2009", Some(80.0)),
                obs("A", "2000", Some(78.0)),
                obs("A", "1995", Some(77.0)),
                obs("B", "2000", Some(70.0)),
            ],
        );
        let electricity = set(
            Indicator::ElectricPowerConsumption,
            vec![obs("A", "2000", Some(15000.0)), obs("A", "2009", Some(16000.0)), obs("A", "1995", Some(1.0))],
        );
        let countries = vec!["A".to_string(), "B".to_string()];
        let chart = electricity_vs_urban_chart(&urban, &electricity, &countries);

        assert_eq!(chart.data.len(), 2);
        assert_eq!(chart.data[0].x, AxisValues::Numbers(vec![Some(78.0), Some(80.0)]));
        assert_eq!(chart.data[0].y, vec![Some(15000.0), Some(16000.0)]);
        assert_eq!(
            chart.data[0].text,
            Some(vec!["A 2000".to_string(), "A 2009".to_string()])
        );
        assert_eq!(chart.data[0].mode, Some(TraceMode::LinesMarkers));
        // B has no electricity data, so its series is empty.
        assert!(chart.data[1].y.is_empty());
        assert_eq!(chart.layout.xaxis.range, Some([60.0, 90.0]));
    }

    #[test]
    fn co2_renewables_chart_puts_co2_on_x() {
        let co2 = set(Indicator::Co2PerCapita, vec![obs("A", "2018", Some(15.0))]);
        let renewables = set(Indicator::RenewableEnergyShare, vec![obs("A", "2018", Some(10.0))]);
        let chart = co2_vs_renewables_chart(&co2, &renewables, &["A".to_string()]);
        assert_eq!(chart.data[0].x, AxisValues::Numbers(vec![Some(15.0)]));
        assert_eq!(chart.data[0].y, vec![Some(10.0)]);
        assert_eq!(chart.data[0].marker, Some(Marker { size: 8.0 }));
        assert_eq!(chart.data[0].mode, Some(TraceMode::Markers));
    }
}
