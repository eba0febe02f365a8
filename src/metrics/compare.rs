use serde::{Deserialize, Serialize};

use crate::error::DistributionError;
use crate::metrics::distribution::DurationTable;

/// Where one push's duration falls within its push def's history
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushComparison {
    pub duration: f64,
    pub percentile: f64,
    pub median: f64,
    pub slower_than_median: bool,
}

pub fn compare_duration(table: &DurationTable, duration: f64) -> Result<PushComparison, DistributionError> {
    let percentile = table.probability_for_duration(duration)?;
    let median = table.duration_for_probability(table.scale().from_percent(50.0))?;
    Ok(PushComparison {
        duration,
        percentile,
        median,
        slower_than_median: duration > median,
    })
}
