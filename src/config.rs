use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::record::PushState;
use crate::error::StoreError;

/// Unit that durations and timeline positions are expressed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanos,
    Millis,
    Seconds,
    Minutes,
}

impl TimeUnit {
    pub fn nanos_per_unit(self) -> f64 {
        match self {
            TimeUnit::Nanos => 1.0,
            TimeUnit::Millis => 1e6,
            TimeUnit::Seconds => 1e9,
            TimeUnit::Minutes => 60e9,
        }
    }

    /// Length of `[from_nsec, to_nsec]` in this unit, computed wide so any pair of `i64` stamps fits.
    pub fn span(self, from_nsec: i64, to_nsec: i64) -> f64 {
        (i128::from(to_nsec) - i128::from(from_nsec)) as f64 / self.nanos_per_unit()
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanos => "ns",
            TimeUnit::Millis => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
        }
    }
}

/// Whether probabilities run over 0..=100 or 0..=1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbabilityScale {
    Percent,
    Fraction,
}

impl ProbabilityScale {
    pub fn max(self) -> f64 {
        match self {
            ProbabilityScale::Percent => 100.0,
            ProbabilityScale::Fraction => 1.0,
        }
    }

    /// Convert percentage points into this scale.
    pub fn from_percent(self, percent: f64) -> f64 {
        percent * self.max() / 100.0
    }
}

/// Percentile marker declutter settings. Probability-valued fields are percentage points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantileConfig {
    pub requested: [f64; 3],
    pub pixel_threshold: f64,
    pub step: f64,
    pub min_bound: f64,
    pub max_bound: f64,
    pub max_iterations: usize,
}

impl Default for QuantileConfig {
    fn default() -> Self {
        Self {
            requested: [10.0, 50.0, 90.0],
            pixel_threshold: 15.0,
            step: 1.0,
            min_bound: 1.0,
            max_bound: 99.0,
            max_iterations: 200,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotPlotConfig {
    pub radius: f64,
    pub min_radius: f64,
    pub radius_step: f64,
    pub max_height: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl Default for DotPlotConfig {
    fn default() -> Self {
        Self {
            radius: 6.0,
            min_radius: 1.0,
            radius_step: 0.5,
            max_height: 120.0,
            epsilon: 0.01,
            max_iterations: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub time_unit: TimeUnit,
    pub scale: ProbabilityScale,
    pub end_states: Vec<PushState>,
    pub quantiles: QuantileConfig,
    pub dot_plot: DotPlotConfig,
    pub chart_width: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::Minutes,
            scale: ProbabilityScale::Percent,
            end_states: vec![PushState::Completed],
            quantiles: QuantileConfig::default(),
            dot_plot: DotPlotConfig::default(),
            chart_width: 800.0,
        }
    }
}

impl ChartConfig {
    /// Load a JSON config file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ChartConfig =
            serde_json::from_str(r#"{"scale":"fraction","quantiles":{"pixel_threshold":20.0}}"#)
                .unwrap();
        assert_eq!(cfg.scale, ProbabilityScale::Fraction);
        assert_eq!(cfg.quantiles.pixel_threshold, 20.0);
        assert_eq!(cfg.quantiles.requested, [10.0, 50.0, 90.0]);
        assert_eq!(cfg.time_unit, TimeUnit::Minutes);
        assert_eq!(cfg.end_states, vec![PushState::Completed]);
    }

    #[test]
    fn unit_conversions() {
        assert_eq!(TimeUnit::Minutes.span(0, 90_000_000_000), 1.5);
        assert_eq!(TimeUnit::Millis.span(1_000_000, 3_500_000), 2.5);
        assert_eq!(TimeUnit::Nanos.span(i64::MIN, i64::MAX), u64::MAX as f64);
        assert_eq!(ProbabilityScale::Fraction.from_percent(50.0), 0.5);
        assert_eq!(ProbabilityScale::Percent.from_percent(50.0), 50.0);
    }
}
