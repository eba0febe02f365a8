use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::QuantileConfig;
use crate::error::DistributionError;
use crate::metrics::distribution::DurationTable;

/// Guide line at a requested percentile
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercentileMarker {
    pub duration: f64,
    pub probability: f64,
}

fn marker(table: &DurationTable, probability: f64) -> Result<PercentileMarker, DistributionError> {
    Ok(PercentileMarker {
        duration: table.duration_for_probability(probability)?,
        probability,
    })
}

/// Low/mid/high percentile markers spaced at least `pixel_threshold` apart on screen.
///
/// While two neighbouring markers are too close, the outer percentiles move
/// outwards by `step` (the median stays put). Once the low bound drops below
/// `min_bound` or the high bound passes `max_bound`, only the median marker is
/// returned.
pub fn generate_quantile_markers<F>(
    table: &DurationTable,
    config: &QuantileConfig,
    pixel_scale: F,
) -> Result<Vec<PercentileMarker>, DistributionError>
where
    F: Fn(f64) -> f64,
{
    let scale = table.scale();
    let [low, mid, high] = config.requested.map(|p| scale.from_percent(p));
    let step = scale.from_percent(config.step);
    let min_bound = scale.from_percent(config.min_bound);
    let max_bound = scale.from_percent(config.max_bound);

    let median = marker(table, mid)?;

    for iteration in 0..=config.max_iterations {
        let widen = step * iteration as f64;
        let (lo, hi) = (low - widen, high + widen);
        if lo < min_bound || hi > max_bound {
            break;
        }

        let markers = [marker(table, lo)?, median, marker(table, hi)?];
        let crowded = markers
            .iter()
            .map(|m| pixel_scale(m.duration))
            .tuple_windows()
            .any(|(a, b)| (b - a).abs() < config.pixel_threshold);
        if !crowded {
            return Ok(markers.to_vec());
        }
        tracing::debug!(iteration, low = lo, high = hi, "Percentile markers crowded, widening");
    }

    Ok(vec![median])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbabilityScale;

    fn table(durations: &[f64], scale: ProbabilityScale) -> DurationTable {
        DurationTable::from_durations(durations, scale).unwrap()
    }

    #[test]
    fn spread_data_keeps_three_markers() {
        let t = table(&[1.0, 2.0, 3.0, 4.0, 10.0], ProbabilityScale::Percent);
        let markers = generate_quantile_markers(&t, &QuantileConfig::default(), |d| d * 50.0).unwrap();
        let probs: Vec<_> = markers.iter().map(|m| m.probability).collect();
        assert_eq!(probs, vec![10.0, 50.0, 90.0]);
        assert!((markers[1].duration - 3.5).abs() < 1e-9);
    }

    #[test]
    fn tight_cluster_collapses_to_median() {
        let t = table(&[100.0, 100.001, 100.002, 100.003], ProbabilityScale::Percent);
        let markers = generate_quantile_markers(&t, &QuantileConfig::default(), |d| d).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].probability, 50.0);
    }

    #[test]
    fn widening_moves_outer_markers_only() {
        // 100 samples at 0..100; pixel gap per percentage point is 1px
        let durations: Vec<f64> = (0..100).map(f64::from).collect();
        let t = table(&durations, ProbabilityScale::Percent);
        let config = QuantileConfig {
            requested: [40.0, 50.0, 60.0],
            pixel_threshold: 15.0,
            ..QuantileConfig::default()
        };
        let markers = generate_quantile_markers(&t, &config, |d| d).unwrap();
        let probs: Vec<_> = markers.iter().map(|m| m.probability).collect();
        assert_eq!(probs, vec![35.0, 50.0, 65.0]);
    }

    #[test]
    fn fraction_scale_uses_scaled_bounds() {
        let t = table(&[5.0, 5.0, 5.0], ProbabilityScale::Fraction);
        let markers = generate_quantile_markers(&t, &QuantileConfig::default(), |d| d).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].probability, 0.5);
        assert_eq!(markers[0].duration, 5.0);
    }

    #[test]
    fn zero_step_stops_after_iteration_limit() {
        let t = table(&[1.0, 1.0, 1.0], ProbabilityScale::Percent);
        let config = QuantileConfig {
            step: 0.0,
            max_iterations: 5,
            ..QuantileConfig::default()
        };
        assert_eq!(generate_quantile_markers(&t, &config, |d| d).unwrap().len(), 1);
    }

    #[test]
    fn empty_table_is_an_error() {
        let t = table(&[], ProbabilityScale::Percent);
        assert_eq!(
            generate_quantile_markers(&t, &QuantileConfig::default(), |d| d),
            Err(DistributionError::EmptyDataset)
        );
    }
}
