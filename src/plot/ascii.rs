//! ASCII plotting of chart payloads for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - each series gets a letter (`A`, `B`, ...) listed in the legend line
//! - line modes connect consecutive points with `.`
//! - bars fill their column from the baseline with the series letter

use crate::domain::{AxisValues, ChartPayload, Series, TraceKind, TraceMode};

/// Render one chart as a character grid with a header and legend.
pub fn render_chart(chart: &ChartPayload, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let categories = categories(&chart.data);
    let series_points: Vec<Vec<(f64, f64)>> = chart
        .data
        .iter()
        .map(|s| points(s, categories.as_deref()))
        .collect();

    let has_bars = chart.data.iter().any(|s| s.kind == TraceKind::Bar);

    let (x_min, x_max) = range(series_points.iter().flatten().map(|p| p.0), false).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(series_points.iter().flatten().map(|p| p.1), has_bars).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers overlay them.
    for (series, pts) in chart.data.iter().zip(&series_points) {
        if matches!(series.mode, Some(TraceMode::Lines) | Some(TraceMode::LinesMarkers)) {
            draw_polyline(&mut grid, pts, (x_min, x_max), (y_min, y_max));
        }
    }

    for (i, (series, pts)) in chart.data.iter().zip(&series_points).enumerate() {
        let ch = glyph(i);
        for &(x, y) in pts {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            if series.kind == TraceKind::Bar {
                let base = map_y(0.0_f64.clamp(y_min, y_max), y_min, y_max, height);
                let (top, bottom) = if row <= base { (row, base) } else { (base, row) };
                for line in grid.iter_mut().take(bottom + 1).skip(top) {
                    line[col] = ch;
                }
            } else {
                grid[row][col] = ch;
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{} | x=[{x_min:.2}, {x_max:.2}] | y=[{y_min:.2}, {y_max:.2}]\n",
        chart.layout.title
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = chart
        .data
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}={}", glyph(i), s.name.as_deref().unwrap_or("?")))
        .collect();
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

fn glyph(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Category labels when any series has non-numeric x labels (e.g. country names).
fn categories(data: &[Series]) -> Option<Vec<String>> {
    let mut labels: Vec<String> = Vec::new();
    let mut numeric = true;
    for s in data {
        if let AxisValues::Labels(xs) = &s.x {
            for x in xs {
                if x.trim().parse::<f64>().is_err() {
                    numeric = false;
                }
                if !labels.contains(x) {
                    labels.push(x.clone());
                }
            }
        }
    }
    if numeric { None } else { Some(labels) }
}

/// Plottable (x, y) pairs of a series; missing values are skipped.
fn points(series: &Series, categories: Option<&[String]>) -> Vec<(f64, f64)> {
    let xs: Vec<Option<f64>> = match &series.x {
        AxisValues::Numbers(v) => v.clone(),
        AxisValues::Labels(v) => v
            .iter()
            .map(|label| match categories {
                Some(cats) => cats.iter().position(|c| c == label).map(|i| i as f64),
                None => label.trim().parse::<f64>().ok(),
            })
            .collect(),
    };

    xs.into_iter()
        .zip(series.y.iter().copied())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        })
        .collect()
}

fn range(values: impl Iterator<Item = f64>, include_zero: bool) -> Option<(f64, f64)> {
    let mut min = if include_zero { 0.0 } else { f64::INFINITY };
    let mut max = if include_zero { 0.0 } else { f64::NEG_INFINITY };
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], pts: &[(f64, f64)], x: (f64, f64), y: (f64, f64)) {
    if pts.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let cells: Vec<(usize, usize)> = pts
        .iter()
        .map(|&(px, py)| (map_x(px, x.0, x.1, width), map_y(py, y.0, y.1, height)))
        .collect();
    for pair in cells.windows(2) {
        draw_line(grid, pair[0], pair[1], '.');
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let mut x0 = from.0 as isize;
    let mut y0 = from.1 as isize;
    let x1 = to.0 as isize;
    let y1 = to.1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
