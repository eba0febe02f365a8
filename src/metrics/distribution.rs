use interp1d::Interp1d;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::config::ProbabilityScale;
use crate::data::record::PushState;
use crate::error::DistributionError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationSample {
    pub duration: f64,
    pub probability: f64,
    pub end_state: PushState,
}

/// Empirical CDF over push durations, sorted ascending by duration and probability.
///
/// A sample's probability is the share of samples with a duration at or below its
/// own, so tied durations all carry the probability of the highest rank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationTable {
    samples: Vec<DurationSample>,
    scale: ProbabilityScale,
}

impl DurationTable {
    pub fn build(
        values: &[(f64, PushState)],
        scale: ProbabilityScale,
    ) -> Result<Self, DistributionError> {
        if values.iter().any(|(d, _)| !d.is_finite() || *d < 0.0) {
            return Err(DistributionError::NonFiniteDuration);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by_key(|(d, _)| OrderedFloat(*d));

        let n = sorted.len();
        let mut samples = Vec::with_capacity(n);
        let mut rank = n;
        for i in (0..n).rev() {
            if i + 1 < n && sorted[i].0 != sorted[i + 1].0 {
                rank = i + 1;
            }
            samples.push(DurationSample {
                duration: sorted[i].0,
                probability: rank as f64 * scale.max() / n as f64,
                end_state: sorted[i].1,
            });
        }
        samples.reverse();

        Ok(Self { samples, scale })
    }

    /// Durations tagged as completed, the state distributions are built from by default.
    pub fn from_durations(
        durations: &[f64],
        scale: ProbabilityScale,
    ) -> Result<Self, DistributionError> {
        let values: Vec<_> = durations.iter().map(|&d| (d, PushState::Completed)).collect();
        Self::build(&values, scale)
    }

    /// Rebuild a table from previously computed samples.
    pub fn from_samples(
        samples: Vec<DurationSample>,
        scale: ProbabilityScale,
    ) -> Result<Self, DistributionError> {
        if samples.iter().any(|s| !s.duration.is_finite() || s.duration < 0.0) {
            return Err(DistributionError::NonFiniteDuration);
        }
        let max = scale.max();
        if let Some(s) = samples.iter().find(|s| !(0.0..=max).contains(&s.probability)) {
            return Err(DistributionError::OutOfRange { probability: s.probability, max });
        }
        let sorted = samples
            .windows(2)
            .all(|w| w[0].duration <= w[1].duration && w[0].probability <= w[1].probability);
        if !sorted {
            return Err(DistributionError::Unsorted);
        }
        Ok(Self { samples, scale })
    }

    pub fn samples(&self) -> &[DurationSample] {
        &self.samples
    }

    pub fn scale(&self) -> ProbabilityScale {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn durations(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.duration).collect()
    }

    /// Probability of the greatest sample whose duration is `<= duration`; 0 below the minimum.
    pub fn probability_for_duration(&self, duration: f64) -> Result<f64, DistributionError> {
        if self.samples.is_empty() {
            return Err(DistributionError::EmptyDataset);
        }
        if duration.is_nan() {
            return Err(DistributionError::NonFiniteDuration);
        }
        let idx = self.samples.partition_point(|s| s.duration <= duration);
        Ok(match idx {
            0 => 0.0,
            i => self.samples[i - 1].probability,
        })
    }

    /// Inverse CDF with linear interpolation between neighbouring samples.
    ///
    /// Each sample's probability is the top of its step; interpolation runs over
    /// the step bottoms, so the query is shifted up by one step before bracketing.
    pub fn duration_for_probability(&self, probability: f64) -> Result<f64, DistributionError> {
        let (first, last) = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DistributionError::EmptyDataset),
        };
        let max = self.scale.max();
        if !(0.0..=max).contains(&probability) {
            return Err(DistributionError::OutOfRange { probability, max });
        }

        let target = probability + max / self.samples.len() as f64;
        let idx = self.samples.partition_point(|s| s.probability <= target);
        if idx == 0 {
            return Ok(first.duration);
        }
        if idx == self.samples.len() {
            return Ok(last.duration);
        }

        let left = &self.samples[idx - 1];
        let right = &self.samples[idx];
        let segment = Interp1d::new_sorted(
            vec![left.probability, right.probability],
            vec![left.duration, right.duration],
        )
        .map_err(|e| DistributionError::Interpolation(format!("{e:?}")))?;
        Ok(segment.interpolate(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(durations: &[f64]) -> DurationTable {
        DurationTable::from_durations(durations, ProbabilityScale::Percent).unwrap()
    }

    fn probabilities(t: &DurationTable) -> Vec<f64> {
        t.samples().iter().map(|s| s.probability).collect()
    }

    #[test]
    fn builds_reference_table() {
        let t = table(&[4.0, 1.0, 10.0, 3.0, 2.0]);
        assert_eq!(t.durations(), vec![1.0, 2.0, 3.0, 4.0, 10.0]);
        assert_eq!(probabilities(&t), vec![20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn fraction_scale() {
        let t = DurationTable::from_durations(&[2.0, 1.0], ProbabilityScale::Fraction).unwrap();
        assert_eq!(probabilities(&t), vec![0.5, 1.0]);
        assert_eq!(t.duration_for_probability(1.0).unwrap(), 2.0);
        assert!(t.duration_for_probability(1.5).is_err());
    }

    #[test]
    fn ties_share_the_highest_rank() {
        let t = table(&[2.0, 1.0, 2.0, 3.0]);
        assert_eq!(probabilities(&t), vec![25.0, 75.0, 75.0, 100.0]);
        assert_eq!(t.probability_for_duration(2.0).unwrap(), 75.0);
    }

    #[test]
    fn keeps_end_states_with_their_durations() {
        let t = DurationTable::build(
            &[(5.0, PushState::Reverted), (1.0, PushState::Completed)],
            ProbabilityScale::Percent,
        )
        .unwrap();
        assert_eq!(t.samples()[0].end_state, PushState::Completed);
        assert_eq!(t.samples()[1].end_state, PushState::Reverted);
    }

    #[test]
    fn probability_lookup() {
        let t = table(&[1.0, 2.0, 3.0, 4.0, 10.0]);
        assert_eq!(t.probability_for_duration(3.5).unwrap(), 60.0);
        assert_eq!(t.probability_for_duration(3.0).unwrap(), 60.0);
        assert_eq!(t.probability_for_duration(0.5).unwrap(), 0.0);
        assert_eq!(t.probability_for_duration(1e9).unwrap(), 100.0);
    }

    #[test]
    fn duration_lookup_interpolates() {
        let t = table(&[1.0, 2.0, 3.0, 4.0, 10.0]);
        assert!((t.duration_for_probability(50.0).unwrap() - 3.5).abs() < 1e-9);
        assert_eq!(t.duration_for_probability(0.0).unwrap(), 1.0);
        assert_eq!(t.duration_for_probability(100.0).unwrap(), 10.0);
        assert_eq!(t.duration_for_probability(80.0).unwrap(), 10.0);
        assert!((t.duration_for_probability(70.0).unwrap() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn single_sample_table() {
        let t = table(&[7.0]);
        assert_eq!(t.duration_for_probability(50.0).unwrap(), 7.0);
        assert_eq!(t.probability_for_duration(7.0).unwrap(), 100.0);
    }

    #[test]
    fn empty_and_out_of_range_queries() {
        let empty = table(&[]);
        assert!(empty.is_empty());
        assert_eq!(
            empty.probability_for_duration(1.0),
            Err(DistributionError::EmptyDataset)
        );
        assert_eq!(
            empty.duration_for_probability(50.0),
            Err(DistributionError::EmptyDataset)
        );

        let t = table(&[1.0, 2.0]);
        assert_eq!(
            t.duration_for_probability(101.0),
            Err(DistributionError::OutOfRange {
                probability: 101.0,
                max: 100.0
            })
        );
        assert!(t.duration_for_probability(-1.0).is_err());
        assert!(t.duration_for_probability(f64::NAN).is_err());
        assert_eq!(
            t.probability_for_duration(f64::NAN),
            Err(DistributionError::NonFiniteDuration)
        );
    }

    #[test]
    fn rejects_invalid_durations() {
        assert_eq!(
            DurationTable::from_durations(&[1.0, -2.0], ProbabilityScale::Percent),
            Err(DistributionError::NonFiniteDuration)
        );
        assert!(DurationTable::from_durations(&[f64::INFINITY], ProbabilityScale::Percent).is_err());
    }

    #[test]
    fn from_samples_requires_sorted_input() {
        let t = table(&[1.0, 2.0, 3.0]);
        let mut samples = t.samples().to_vec();
        assert_eq!(
            DurationTable::from_samples(samples.clone(), ProbabilityScale::Percent).unwrap(),
            t
        );
        samples.swap(0, 2);
        assert_eq!(
            DurationTable::from_samples(samples, ProbabilityScale::Percent),
            Err(DistributionError::Unsorted)
        );
    }

    #[test]
    fn from_samples_rejects_probabilities_outside_the_scale() {
        let t = table(&[1.0, 2.0, 3.0]);
        let first = t.samples()[0].probability;
        assert_eq!(
            DurationTable::from_samples(t.samples().to_vec(), ProbabilityScale::Fraction),
            Err(DistributionError::OutOfRange { probability: first, max: 1.0 })
        );
    }
}
