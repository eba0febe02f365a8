//! Serializable chart payloads handed to the rendering layer.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::{ChartConfig, ProbabilityScale, TimeUnit};
use crate::data::history::PushHistory;
use crate::data::record::{Extraction, PushState, SkippedRecord};
use crate::error::{DistributionError, LayoutError, StoreError};
use crate::layout::rows::{pack, Interval};
use crate::metrics::distribution::DurationSample;
use crate::metrics::offsets::fit_dot_radius;
use crate::metrics::quantiles::{generate_quantile_markers, PercentileMarker};

/// Maps a value domain linearly onto a pixel range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Scale spanning `values`, or `[0, 1]` when there are none.
    pub fn fit(values: &[f64], width: f64) -> Self {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let domain = if lo.is_finite() && hi.is_finite() { (lo, hi) } else { (0.0, 1.0) };
        Self::new(domain, (0.0, width))
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) * (r1 - r0) / (d1 - d0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineBar {
    pub id: String,
    pub push_def: String,
    pub start: f64,
    pub end: f64,
    pub row: usize,
    pub end_state: PushState,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineChart {
    pub unit: TimeUnit,
    pub origin_nsec: i64,
    pub row_count: usize,
    pub bars: Vec<TimelineBar>,
    pub skipped: Vec<SkippedRecord>,
}

/// Lay out every extracted push on non-overlapping timeline rows.
pub fn timeline_chart(extraction: &Extraction, unit: TimeUnit) -> Result<TimelineChart, LayoutError> {
    let origin_nsec = extraction
        .windows
        .iter()
        .map(|w| w.start_nsec)
        .min()
        .unwrap_or(0);
    let intervals: Vec<Interval> = extraction
        .windows
        .iter()
        .map(|w| w.to_interval(unit, origin_nsec))
        .collect();
    let layout = pack(&intervals)?;

    let bars = extraction
        .windows
        .iter()
        .zip(intervals)
        .zip(layout.rows)
        .map(|((window, interval), assignment)| TimelineBar {
            id: assignment.id,
            push_def: window.push_def.clone(),
            start: interval.start_time,
            end: interval.end_time,
            row: assignment.row,
            end_state: window.end_state,
        })
        .collect();

    Ok(TimelineChart {
        unit,
        origin_nsec,
        row_count: layout.row_count,
        bars,
        skipped: extraction.skipped.clone(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Dot {
    pub duration: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistributionChart {
    pub push_def: String,
    pub unit: TimeUnit,
    pub scale: ProbabilityScale,
    pub samples: Vec<DurationSample>,
    pub markers: Vec<PercentileMarker>,
    pub radius: f64,
    pub dots: Vec<Dot>,
}

/// CDF steps, percentile guides and dot-plot positions for one push def.
pub fn distribution_chart(
    history: &PushHistory,
    push_def: &str,
    config: &ChartConfig,
) -> Result<DistributionChart, DistributionError> {
    let table = history.table(push_def, config.time_unit, config.scale, &config.end_states)?;
    let durations = table.durations();
    let x_scale = LinearScale::fit(&durations, config.chart_width);

    let markers = generate_quantile_markers(&table, &config.quantiles, |d| x_scale.apply(d))?;
    let dots = fit_dot_radius(&durations, &config.dot_plot, |d| x_scale.apply(d));

    Ok(DistributionChart {
        push_def: push_def.to_string(),
        unit: config.time_unit,
        scale: config.scale,
        radius: dots.radius,
        dots: durations
            .iter()
            .zip(dots.offsets)
            .map(|(&duration, y)| Dot {
                duration,
                x: x_scale.apply(duration),
                y,
            })
            .collect(),
        markers,
        samples: table.samples().to_vec(),
    })
}

pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
