use crate::core::analysis::reason_counts;
use crate::domain::model::{RenderedChart, YearRecord};
use crate::utils::error::{EtlError, Result};
use plotters::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Charts produced for a classified dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Leap_Code over the years, joined by a line.
    Line,
    /// Number of years per leap reason.
    Bar,
    /// Frequency of leap vs non-leap years.
    Histogram,
    /// Leap_Code over the years as individual points.
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Histogram,
        ChartKind::Scatter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_end_matches(".svg").to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| EtlError::ValidationError {
                message: format!(
                    "Unknown chart '{}' (use line, bar, histogram or scatter)",
                    s
                ),
            })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

fn chart_error<E: fmt::Display>(e: E) -> EtlError {
    EtlError::ChartError {
        message: e.to_string(),
    }
}

/// Renders `kind` for `records` as an SVG document.
pub fn render(kind: ChartKind, records: &[YearRecord], options: &ChartOptions) -> Result<String> {
    if records.is_empty() {
        return Err(EtlError::ProcessingError {
            message: format!("Cannot draw the {} chart for an empty dataset", kind),
        });
    }

    match kind {
        ChartKind::Line => render_over_time(
            records,
            options,
            "Line Plot of Leap Years Over Time",
            "Leap_Code (1 = Leap, 0 = Non-Leap)",
            false,
        ),
        ChartKind::Scatter => render_over_time(
            records,
            options,
            "Scatter Plot of Leap Years Over Time",
            "Leap_Code",
            true,
        ),
        ChartKind::Bar => {
            let bars: Vec<(String, usize)> = reason_counts(records)
                .into_iter()
                .map(|(reason, count)| (reason.label().to_string(), count))
                .collect();
            render_bars(
                &bars,
                options,
                "Bar Chart of Leap Year Rules",
                "Leap Rule Category",
                "Count of Years",
            )
        }
        ChartKind::Histogram => {
            let leap = records.iter().filter(|r| r.is_leap).count();
            let bars = vec![
                ("0 (Non-Leap)".to_string(), records.len() - leap),
                ("1 (Leap)".to_string(), leap),
            ];
            render_bars(
                &bars,
                options,
                "Histogram of Leap vs Non-Leap Years",
                "Leap_Code (0 = Non-Leap, 1 = Leap)",
                "Frequency",
            )
        }
    }
}

pub fn render_all(records: &[YearRecord], options: &ChartOptions) -> Result<Vec<RenderedChart>> {
    ChartKind::ALL
        .into_iter()
        .map(|kind| {
            Ok(RenderedChart {
                name: kind.name().to_string(),
                svg: render(kind, records, options)?,
            })
        })
        .collect()
}

fn render_over_time(
    records: &[YearRecord],
    options: &ChartOptions,
    title: &str,
    y_desc: &str,
    points_only: bool,
) -> Result<String> {
    let min_x = records.iter().map(|r| r.year).min().unwrap_or(0) as f64;
    let max_x = records.iter().map(|r| r.year).max().unwrap_or(0) as f64;
    let x_range = min_x..(max_x + 1.0);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, -0.1f64..1.1f64)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(y_desc)
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .draw()
            .map_err(chart_error)?;

        let points = records
            .iter()
            .map(|r| (r.year as f64, f64::from(r.leap_code())));
        if points_only {
            chart
                .draw_series(points.map(|point| Circle::new(point, 3, BLUE.filled())))
                .map_err(chart_error)?;
        } else {
            chart
                .draw_series(LineSeries::new(points, &BLUE))
                .map_err(chart_error)?;
        }

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

fn render_bars(
    bars: &[(String, usize)],
    options: &ChartOptions,
    title: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<String> {
    let max_count = bars.iter().map(|(_, count)| *count).max().unwrap_or(0) as f64;
    let x_range = -0.5f64..(bars.len() as f64 - 0.5);
    let y_range = 0f64..(max_count * 1.1).max(1.0);

    let label_for = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        bars.get(idx as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&label_for)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, (_, count))| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *count as f64)], BLUE.filled())
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::Dataset;

    fn sample() -> Vec<YearRecord> {
        Dataset::sample(1990, 2010).augment().unwrap().records
    }

    #[test]
    fn test_chart_kind_parsing() {
        assert_eq!("line".parse::<ChartKind>().unwrap(), ChartKind::Line);
        assert_eq!("Bar.svg".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_render_every_kind_produces_svg() {
        let records = sample();
        let charts = render_all(&records, &ChartOptions::default()).unwrap();
        assert_eq!(charts.len(), 4);
        for chart in charts {
            assert!(chart.svg.contains("<svg"), "{} is not svg", chart.name);
            assert!(chart.svg.contains("</svg>"));
        }
    }

    #[test]
    fn test_bar_chart_includes_reason_labels() {
        let svg = render(ChartKind::Bar, &sample(), &ChartOptions::default()).unwrap();
        assert!(svg.contains("Bar Chart of Leap Year Rules"));
    }

    #[test]
    fn test_render_empty_dataset_fails() {
        let result = render(ChartKind::Line, &[], &ChartOptions::default());
        assert!(matches!(result, Err(EtlError::ProcessingError { .. })));
    }
}
