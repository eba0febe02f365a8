use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// A timeline bar, `[start_time, end_time)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl Interval {
    pub fn new(id: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
        }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(LayoutError::NonFiniteTime { id: self.id.clone() });
        }
        if self.end_time < self.start_time {
            return Err(LayoutError::InvertedInterval { id: self.id.clone() });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAssignment {
    pub id: String,
    pub row: usize,
}

/// Row per input interval, in input order, plus the total number of rows
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLayout {
    pub rows: Vec<RowAssignment>,
    pub row_count: usize,
}

/// Assign every interval to a row so that no two intervals in a row overlap.
///
/// Intervals are taken in ascending start order (ties keep input order). Each
/// pass fills one row greedily: an interval joins the row when it starts at or
/// after the end of the last interval placed there, otherwise it waits for the
/// next pass. Touching intervals (`start == previous end`) share a row.
pub fn pack(intervals: &[Interval]) -> Result<RowLayout, LayoutError> {
    for interval in intervals {
        interval.validate()?;
    }

    let mut remaining: Vec<usize> = (0..intervals.len()).collect();
    remaining.sort_by_key(|&i| OrderedFloat(intervals[i].start_time));

    let mut assigned = vec![0usize; intervals.len()];
    let mut row = 0;
    while !remaining.is_empty() {
        let mut last_end = f64::NEG_INFINITY;
        let mut deferred = Vec::new();
        for idx in remaining {
            let interval = &intervals[idx];
            if interval.start_time >= last_end {
                assigned[idx] = row;
                last_end = interval.end_time;
            } else {
                deferred.push(idx);
            }
        }
        tracing::debug!(row, deferred = deferred.len(), "Packed timeline row");
        remaining = deferred;
        row += 1;
    }

    let rows = intervals
        .iter()
        .zip(assigned)
        .map(|(interval, row)| RowAssignment {
            id: interval.id.clone(),
            row,
        })
        .collect();

    Ok(RowLayout {
        rows,
        row_count: row,
    })
}
