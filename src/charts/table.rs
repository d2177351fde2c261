//! Tabular reshaping shared by the chart builders: ordering, year filters,
//! and the (country, year) inner join.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::domain::{Observation, ObservationSet};

/// Higher values first; missing values last.
fn cmp_value_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by year ascending, then value descending within a year.
///
/// The dashboard has always sorted by value before sorting by year; only the
/// year order is load-bearing for the plotted lines. The value tie-break is
/// kept so the legend lists countries by their earliest-year value.
pub fn sort_chronological(observations: &mut [Observation]) {
    observations.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| cmp_value_desc(a.value, b.value)));
}

/// Stable sort by value descending, missing values last.
pub fn sort_by_value_desc(observations: &mut [Observation]) {
    observations.sort_by(|a, b| cmp_value_desc(a.value, b.value));
}

/// Distinct countries in the order the shared legend uses.
///
/// Derived once per run from the first fetched set and reused by every chart
/// so legend order and colors match across charts.
pub fn country_order(set: &ObservationSet) -> Vec<String> {
    let mut rows = set.observations.clone();
    sort_chronological(&mut rows);
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|o| seen.insert(o.country.clone()))
        .map(|o| o.country)
        .collect()
}

/// Keep only observations whose year is in `years`.
pub fn filter_years(observations: &[Observation], years: &[&str]) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| years.contains(&o.date.as_str()))
        .cloned()
        .collect()
}

/// Observations of one country, in input order.
pub fn rows_for<'a>(observations: &'a [Observation], country: &'a str) -> impl Iterator<Item = &'a Observation> {
    observations.iter().filter(move |o| o.country == country)
}

/// One (country, year) row present in both joined inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub country: String,
    pub date: String,
    /// Value from the left input.
    pub x: Option<f64>,
    /// Value from the right input.
    pub y: Option<f64>,
}

/// Inner join on (country, year).
///
/// Rows follow the left input's order; a key present in only one input is
/// dropped. Missing values do not affect matching.
pub fn inner_join(left: &[Observation], right: &[Observation]) -> Vec<JoinedRow> {
    let mut index: HashMap<(&str, &str), Vec<Option<f64>>> = HashMap::new();
    for o in right {
        index
            .entry((o.country.as_str(), o.date.as_str()))
            .or_default()
            .push(o.value);
    }

    let mut out = Vec::new();
    for l in left {
        let Some(matches) = index.get(&(l.country.as_str(), l.date.as_str())) else {
            continue;
        };
        for &y in matches {
            out.push(JoinedRow {
                country: l.country.clone(),
                date: l.date.clone(),
                x: l.value,
                y,
            });
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::Indicator;

    pub(crate) fn obs(country: &str, date: &str, value: Option<f64>) -> Observation {
        Observation {
            country: country.to_string(),
            indicator: "test".to_string(),
            date: date.to_string(),
            value,
        }
    }

    #[test]
    fn snapshot_filter_keeps_only_listed_years() {
        let rows: Vec<Observation> = ["1991", "1995", "2000", "2009", "2018", "2020"]
            .iter()
            .map(|y| obs("A", y, Some(1.0)))
            .collect();
        let kept = filter_years(&rows, &["1991", "2000", "2009", "2018"]);
        let years: Vec<&str> = kept.iter().map(|o| o.date.as_str()).collect();
        assert_eq!(years, vec!["1991", "2000", "2009", "2018"]);
    }

    #[test]
    fn chronological_sort_orders_years_then_values() {
        let mut rows = vec![
            obs("A", "2018", Some(1.0)),
            obs("B", "1991", None),
            obs("A", "1991", Some(2.0)),
            obs("C", "1991", Some(5.0)),
        ];
        sort_chronological(&mut rows);
        let keys: Vec<(&str, &str)> = rows.iter().map(|o| (o.country.as_str(), o.date.as_str())).collect();
        assert_eq!(keys, vec![("C", "1991"), ("A", "1991"), ("B", "1991"), ("A", "2018")]);
    }

    #[test]
    fn country_order_is_distinct_and_follows_earliest_year() {
        // API order is newest year first.
        let set = ObservationSet::new(
            Indicator::AgriculturalLand,
            vec![
                obs("Canada", "1992", Some(7.0)),
                obs("Brazil", "1992", Some(28.0)),
                obs("Canada", "1991", Some(7.2)),
                obs("Brazil", "1991", Some(27.0)),
            ],
        );
        assert_eq!(country_order(&set), vec!["Brazil".to_string(), "Canada".to_string()]);
    }

    #[test]
    fn inner_join_drops_keys_missing_from_either_side() {
        let left = vec![
            obs("A", "2000", Some(1.0)),
            obs("A", "2009", Some(2.0)),
            obs("B", "2000", Some(3.0)),
        ];
        let right = vec![
            obs("A", "2000", Some(10.0)),
            obs("B", "2000", None),
            obs("C", "2000", Some(30.0)),
        ];
        let joined = inner_join(&left, &right);
        assert_eq!(
            joined,
            vec![
                JoinedRow { country: "A".into(), date: "2000".into(), x: Some(1.0), y: Some(10.0) },
                JoinedRow { country: "B".into(), date: "2000".into(), x: Some(3.0), y: None },
            ]
        );
    }

    #[test]
    fn value_sort_puts_missing_last() {
        let mut rows = vec![obs("A", "2018", None), obs("B", "2018", Some(1.0)), obs("C", "2018", Some(3.0))];
        sort_by_value_desc(&mut rows);
        let order: Vec<&str> = rows.iter().map(|o| o.country.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }
}
