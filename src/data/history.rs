use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::{ProbabilityScale, TimeUnit};
use crate::data::record::{PushState, PushWindow};
use crate::error::DistributionError;
use crate::metrics::distribution::DurationTable;

/// Measured push windows grouped by push def
#[derive(Clone, Debug, Default)]
pub struct PushHistory {
    by_def: BTreeMap<String, Vec<PushWindow>>,
}

impl PushHistory {
    pub fn from_windows(windows: impl IntoIterator<Item = PushWindow>) -> Self {
        let mut by_def: BTreeMap<String, Vec<PushWindow>> = BTreeMap::new();
        for window in windows {
            by_def.entry(window.push_def.clone()).or_default().push(window);
        }
        Self { by_def }
    }

    pub fn push_defs(&self) -> impl Iterator<Item = &str> {
        self.by_def.keys().map(String::as_str)
    }

    pub fn windows(&self, push_def: &str) -> &[PushWindow] {
        self.by_def.get(push_def).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn find(&self, push_id: &str) -> Option<&PushWindow> {
        self.by_def.values().flatten().find(|w| w.id == push_id)
    }

    /// `(duration, end state)` for windows of `push_def` that ended in one of `end_states`.
    pub fn samples(&self, push_def: &str, unit: TimeUnit, end_states: &[PushState]) -> Vec<(f64, PushState)> {
        self.windows(push_def)
            .iter()
            .filter(|w| end_states.contains(&w.end_state))
            .map(|w| (w.duration(unit), w.end_state))
            .collect()
    }

    pub fn durations(&self, push_def: &str, unit: TimeUnit, end_states: &[PushState]) -> Vec<f64> {
        self.samples(push_def, unit, end_states)
            .into_iter()
            .map(|(d, _)| d)
            .collect()
    }

    pub fn table(
        &self,
        push_def: &str,
        unit: TimeUnit,
        scale: ProbabilityScale,
        end_states: &[PushState],
    ) -> Result<DurationTable, DistributionError> {
        DurationTable::build(&self.samples(push_def, unit, end_states), scale)
    }

    /// One table per push def, skipping defs without qualifying pushes.
    pub fn tables(
        &self,
        unit: TimeUnit,
        scale: ProbabilityScale,
        end_states: &[PushState],
    ) -> Result<BTreeMap<String, DurationTable>, DistributionError> {
        let tables: Vec<(String, DurationTable)> = self
            .by_def
            .par_iter()
            .map(|(def, _)| {
                self.table(def, unit, scale, end_states)
                    .map(|table| (def.clone(), table))
            })
            .collect::<Result<_, DistributionError>>()?;

        let tables: BTreeMap<_, _> = tables.into_iter().filter(|(_, t)| !t.is_empty()).collect();
        tracing::info!(
            push_defs = self.by_def.len(),
            tables = tables.len(),
            "Built duration tables"
        );
        Ok(tables)
    }
}
