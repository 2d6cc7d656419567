//! SVG charts
//!
//! Drawing only: callers pass series and aggregates that are already computed.

use std::fmt::Display;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

use crate::aggregate::{DisplayZone, ProcessAggregate, ProcessKey};
use crate::error::{MonitorError, Result};
use crate::model::{Metric, SampleRecord};

const LINE_CHART_SIZE: (u32, u32) = (1200, 480);
const BAR_CHART_SIZE: (u32, u32) = (1200, 600);

const CPU_COLOR: RGBColor = RGBColor(0xff, 0x6b, 0x6b);
const MEM_COLOR: RGBColor = RGBColor(0x4d, 0xab, 0xf7);
const DISK_COLOR: RGBColor = RGBColor(0x94, 0xd8, 0x2d);
const CPU_BAR_COLOR: RGBColor = RGBColor(0xff, 0x92, 0x2b);
const MEM_BAR_COLOR: RGBColor = RGBColor(0x42, 0x63, 0xeb);

/// One point of the usage line chart
#[derive(Debug, Clone, PartialEq)]
pub struct UsagePoint {
    pub timestamp: DateTime<Utc>,
    pub cpu: f64,
    pub mem: f64,
    pub disk: f64,
}

impl UsagePoint {
    fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::Mem => self.mem,
            Metric::Disk => self.disk,
        }
    }
}

/// Time series of the three system metrics, in log order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSeries {
    points: Vec<UsagePoint>,
}

impl UsageSeries {
    pub fn from_records(records: &[SampleRecord]) -> Self {
        let points = records
            .iter()
            .map(|r| UsagePoint {
                timestamp: r.timestamp,
                cpu: r.cpu_percent,
                mem: r.mem_percent,
                disk: r.disk_percent,
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[UsagePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

fn metric_color(metric: Metric) -> RGBColor {
    match metric {
        Metric::Cpu => CPU_COLOR,
        Metric::Mem => MEM_COLOR,
        Metric::Disk => DISK_COLOR,
    }
}

fn chart_error<E: Display>(err: E) -> MonitorError {
    MonitorError::Chart(err.to_string())
}

/// Draw cpu/mem/disk over time with the x axis labelled in `zone`.
///
/// `series` must not be empty.
pub fn draw_usage_chart(path: &Path, series: &UsageSeries, zone: &DisplayZone) -> Result<()> {
    let points = series.points();
    let start = match points.first() {
        Some(first) => first.timestamp,
        None => return Ok(()),
    };

    let offsets: Vec<f64> = points
        .iter()
        .map(|p| (p.timestamp - start).num_seconds() as f64)
        .collect();
    let span = offsets.iter().copied().fold(1.0, f64::max);

    let root = SVGBackend::new(path, LINE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("System resource usage [{}]", zone), ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..span, 0f64..100f64)
        .map_err(chart_error)?;

    let label_time = |seconds: &f64| {
        let at = start + Duration::milliseconds((seconds * 1000.0) as i64);
        zone.localize(&at).format("%H:%M:%S").to_string()
    };

    chart
        .configure_mesh()
        .x_desc(format!("Time ({})", zone.label))
        .y_desc("Usage (%)")
        .x_labels(8)
        .x_label_formatter(&label_time)
        .light_line_style(BLACK.mix(0.05))
        .draw()
        .map_err(chart_error)?;

    for metric in Metric::ALL {
        let color = metric_color(metric);
        chart
            .draw_series(LineSeries::new(
                offsets
                    .iter()
                    .zip(points)
                    .map(|(&x, point)| (x, point.value(metric))),
                color.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label(format!("{} (%)", metric.label()))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

/// Horizontal bars for already ranked processes, highest at the top.
///
/// `ranked` must not be empty.
pub fn draw_process_bars(path: &Path, ranked: &[&ProcessAggregate], key: ProcessKey) -> Result<()> {
    let rows = ranked.len() as u32;
    if rows == 0 {
        return Ok(());
    }

    let color = match key {
        ProcessKey::CpuAvg => CPU_BAR_COLOR,
        ProcessKey::MemAvg => MEM_BAR_COLOR,
    };
    let x_max = ranked.iter().map(|item| key.value(item)).fold(1.0, f64::max) * 1.1;

    let root = SVGBackend::new(path, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    // Segment 0 stays empty; rank r occupies segment `rows - r`
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Top {} processes by {}", rows, key.label()), ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(180)
        .build_cartesian_2d(0f64..x_max, (0u32..rows).into_segmented())
        .map_err(chart_error)?;

    let label_row = |segment: &SegmentValue<u32>| match segment {
        SegmentValue::CenterOf(row) if *row >= 1 && *row <= rows => {
            ranked[(rows - row) as usize].name.clone()
        }
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows as usize + 1)
        .y_label_formatter(&label_row)
        .x_desc(format!("{} (%)", key.label()))
        .light_line_style(BLACK.mix(0.05))
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(ranked.iter().enumerate().map(|(rank, item)| {
            let row = rows - rank as u32;
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(row)),
                    (key.value(item), SegmentValue::Exact(row + 1)),
                ],
                color.filled(),
            );
            bar.set_margin(4, 4, 0, 0);
            bar
        }))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}
