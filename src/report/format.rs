//! Formatted terminal output for a dashboard run.
//!
//! We keep formatting code in one place so:
//! - the reshaping code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{ChartPayload, FetchFailure, SkippedChart};

/// Format the full run summary (countries, fetched indicators, charts).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== wdi - World Development Indicators dashboard ===\n");
    let names: Vec<&str> = run.countries.countries().iter().map(|c| c.name.as_str()).collect();
    out.push_str(&format!("Countries: {}\n", names.join(", ")));
    out.push_str(&format!("Legend order: {}\n", run.country_order.join(", ")));

    out.push_str("\nIndicators:\n");
    for indicator in &run.fetched.requested {
        match run.fetched.get(*indicator) {
            Some(set) => {
                let span = set
                    .year_span()
                    .map(|(a, b)| format!("{a}..{b}"))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "  {:<18} {:<28} rows={:<5} years={span}\n",
                    indicator.code(),
                    indicator.label(),
                    set.len()
                ));
            }
            None => out.push_str(&format!("  {:<18} {:<28} (not loaded)\n", indicator.code(), indicator.label())),
        }
    }

    out.push_str("\nCharts:\n");
    out.push_str(&format_chart_table(&run.charts));

    if !run.fetched.failures.is_empty() || !run.skipped.is_empty() {
        out.push('\n');
        out.push_str(&format_problems(&run.fetched.failures, &run.skipped));
    }

    out
}

/// One row per chart: position, title, series and point counts.
pub fn format_chart_table(charts: &[ChartPayload]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<3} {:<48} {:>7} {:>7}", "#", "title", "series", "points").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<3} {:-<48} {:-<7} {:-<7}", "", "", "", "").trim_end());
    out.push('\n');

    for (i, chart) in charts.iter().enumerate() {
        out.push_str(
            format!(
                "{:<3} {:<48} {:>7} {:>7}",
                i + 1,
                truncate(&chart.layout.title, 48),
                chart.data.len(),
                chart.point_count()
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Fetch failures and the charts they cost.
pub fn format_problems(failures: &[FetchFailure], skipped: &[SkippedChart]) -> String {
    let mut out = String::new();
    for f in failures {
        out.push_str(&format!("! could not load {} ({}): {}\n", f.indicator, f.indicator.label(), f.reason));
    }
    for s in skipped {
        let missing: Vec<&str> = s.missing.iter().map(|i| i.code()).collect();
        out.push_str(&format!("! skipped \"{}\" (missing {})\n", s.chart.title(), missing.join(", ")));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartKind, Indicator};

    #[test]
    fn truncate_marks_cut_titles() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijk", 5), "abcd.");
    }

    #[test]
    fn problems_list_failures_then_skips() {
        let failures = vec![FetchFailure {
            indicator: Indicator::UrbanPopulation,
            reason: "status 502".to_string(),
        }];
        let skipped = vec![SkippedChart {
            chart: ChartKind::ElectricityVsUrban,
            missing: vec![Indicator::UrbanPopulation],
        }];
        let txt = format_problems(&failures, &skipped);
        let expected = concat!(
            "! could not load SP.URB.TOTL.IN.ZS (urban population): status 502\n",
            "! skipped \"Electric Power Consumption vs Percent of Urban Population\" (missing SP.URB.TOTL.IN.ZS)\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn chart_table_has_one_row_per_chart() {
        let charts = vec![crate::charts::protected_area_chart(&crate::domain::ObservationSet::new(
            Indicator::ProtectedAreas,
            vec![],
        ))];
        let txt = format_chart_table(&charts);
        assert_eq!(txt.lines().count(), 3);
        assert!(txt.lines().nth(2).unwrap().starts_with("1   Terrestrial and Marine Protected Areas in 2018"));
    }
}
