//! Terminal charts
//!
//! Horizontal bar charts drawn with block characters. Bars are scaled to the
//! largest value in the chart; negative values draw as empty bars.

use cev_common::aggregation::{format_fixed, CategorySeries, ComparisonChart};
use colored::Colorize;

/// Width of the longest bar, in characters.
pub const BAR_WIDTH: usize = 40;

const BLOCK: char = '█';

fn bar_len(value: f64, max: f64) -> usize {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_WIDTH as f64).round() as usize
}

fn pad(label: &str, width: usize) -> String {
    let len = label.chars().count();
    format!("{}{}", label, " ".repeat(width.saturating_sub(len)))
}

/// One row per point: `label │████ count`.
pub fn distribution_bars(series: &CategorySeries) -> Vec<String> {
    let label_width = series.points.iter().map(|p| p.label.chars().count()).max().unwrap_or(0);
    let max = series.points.iter().map(|p| p.count).max().unwrap_or(0) as f64;

    series
        .points
        .iter()
        .map(|p| {
            let bar: String = std::iter::repeat(BLOCK).take(bar_len(p.count as f64, max)).collect();
            format!("{} │{} {}", pad(&p.label, label_width), bar.cyan(), p.count)
        })
        .collect()
}

/// One row per point with its share of the total, e.g. `Pump  40.0%`.
pub fn breakdown_rows(series: &CategorySeries) -> Vec<String> {
    let label_width = series.points.iter().map(|p| p.label.chars().count()).max().unwrap_or(0);

    series
        .points
        .iter()
        .zip(series.shares())
        .map(|(p, share)| {
            format!(
                "{} {:>6}%  ({} of {})",
                pad(&p.label, label_width),
                format_fixed(share, 1),
                p.count,
                series.total()
            )
        })
        .collect()
}

/// Grouped bars: one block per label with a bar per series.
///
/// Each series is scaled on its own, since the parameters have unrelated
/// units.
pub fn comparison_bars(chart: &ComparisonChart) -> Vec<String> {
    let name_width = chart.series.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    let maxima: Vec<f64> = chart
        .series
        .iter()
        .map(|s| s.values.iter().copied().fold(0.0, f64::max))
        .collect();

    let mut lines = Vec::new();
    for (i, label) in chart.labels.iter().enumerate() {
        lines.push(label.bold().to_string());
        for (series, max) in chart.series.iter().zip(&maxima) {
            let Some(value) = series.values.get(i).copied() else {
                continue;
            };
            let bar: String = std::iter::repeat(BLOCK).take(bar_len(value, *max)).collect();
            lines.push(format!(
                "  {} │{} {}",
                pad(&series.name, name_width),
                bar.green(),
                format_fixed(value, 2)
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use cev_common::aggregation::{CategoryPoint, ValueSeries};

    fn series() -> CategorySeries {
        CategorySeries {
            title: "Equipment Count".to_string(),
            points: vec![
                CategoryPoint {
                    label: "Pump".to_string(),
                    count: 4,
                },
                CategoryPoint {
                    label: "Valve".to_string(),
                    count: 1,
                },
            ],
        }
    }

    #[test]
    fn test_bar_len_scales_to_widest() {
        assert_eq!(bar_len(10.0, 10.0), BAR_WIDTH);
        assert_eq!(bar_len(5.0, 10.0), BAR_WIDTH / 2);
        assert_eq!(bar_len(0.0, 10.0), 0);
        assert_eq!(bar_len(-3.0, 10.0), 0);
        assert_eq!(bar_len(3.0, 0.0), 0);
        assert_eq!(bar_len(f64::NAN, 1.0), 0);
    }

    #[test]
    fn test_distribution_rows() {
        let rows = distribution_bars(&series());
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("Pump  │"));
        assert!(rows[0].ends_with(" 4"));
        assert!(rows[1].starts_with("Valve │"));
    }

    #[test]
    fn test_breakdown_rows_show_shares() {
        let rows = breakdown_rows(&series());
        assert!(rows[0].contains("80.0%"));
        assert!(rows[1].contains("20.0%"));
        assert!(rows[1].contains("(1 of 5)"));
    }

    #[test]
    fn test_empty_charts_render_nothing() {
        let empty = CategorySeries {
            title: "Equipment Count".to_string(),
            points: vec![],
        };
        assert!(distribution_bars(&empty).is_empty());
        assert!(breakdown_rows(&empty).is_empty());

        let chart = ComparisonChart {
            labels: vec![],
            series: vec![ValueSeries {
                name: "Flowrate".to_string(),
                values: vec![],
            }],
        };
        assert!(comparison_bars(&chart).is_empty());
    }

    #[test]
    fn test_comparison_groups_by_label() {
        let chart = ComparisonChart {
            labels: vec!["Pump-1".to_string(), "Valve-1".to_string()],
            series: vec![
                ValueSeries {
                    name: "Flowrate".to_string(),
                    values: vec![100.0, 50.0],
                },
                ValueSeries {
                    name: "Temperature".to_string(),
                    values: vec![80.0, 120.0],
                },
            ],
        };
        let lines = comparison_bars(&chart);
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("100.00"));
        assert!(lines[5].contains("120.00"));
    }
}
