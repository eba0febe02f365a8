use serde::{Deserialize, Serialize};

use crate::config::TimeUnit;
use crate::layout::rows::Interval;

/// Lifecycle state of a push stage, integer-coded on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum PushState {
    Unknown,
    Running,
    Completed,
    Reverted,
    Failed,
    Cancelled,
    Other(i32),
}

impl From<i32> for PushState {
    fn from(code: i32) -> Self {
        match code {
            0 => PushState::Unknown,
            1 => PushState::Running,
            2 => PushState::Completed,
            3 => PushState::Reverted,
            4 => PushState::Failed,
            5 => PushState::Cancelled,
            other => PushState::Other(other),
        }
    }
}

impl From<PushState> for i32 {
    fn from(state: PushState) -> Self {
        match state {
            PushState::Unknown => 0,
            PushState::Running => 1,
            PushState::Completed => 2,
            PushState::Reverted => 3,
            PushState::Failed => 4,
            PushState::Cancelled => 5,
            PushState::Other(code) => code,
        }
    }
}

impl std::fmt::Display for PushState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushState::Unknown => f.write_str("unknown"),
            PushState::Running => f.write_str("running"),
            PushState::Completed => f.write_str("completed"),
            PushState::Reverted => f.write_str("reverted"),
            PushState::Failed => f.write_str("failed"),
            PushState::Cancelled => f.write_str("cancelled"),
            PushState::Other(code) => write!(f, "state-{code}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub state: Option<PushState>,
    #[serde(default)]
    pub start_time_nsec: Option<i64>,
}

/// A decoded push lifecycle record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushRecord {
    pub id: String,
    #[serde(default)]
    pub push_def: String,
    #[serde(default)]
    pub states: Vec<StateTransition>,
}

/// Measured window of one push: first staged transition to last transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushWindow {
    pub id: String,
    pub push_def: String,
    pub start_nsec: i64,
    pub end_nsec: i64,
    pub end_state: PushState,
}

impl PushWindow {
    pub fn duration(&self, unit: TimeUnit) -> f64 {
        unit.span(self.start_nsec, self.end_nsec)
    }

    /// Timeline interval with times measured from `origin_nsec`.
    pub fn to_interval(&self, unit: TimeUnit, origin_nsec: i64) -> Interval {
        Interval::new(
            self.id.clone(),
            unit.span(origin_nsec, self.start_nsec),
            unit.span(origin_nsec, self.end_nsec),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoTransitions,
    NoStagedTransition,
    MissingStartTime,
    MissingState,
    InvertedWindow,
    WindowOverflow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::NoTransitions => "record has no state transitions",
            SkipReason::NoStagedTransition => "no transition carries a stage",
            SkipReason::MissingStartTime => "transition is missing its start time",
            SkipReason::MissingState => "last transition is missing its state",
            SkipReason::InvertedWindow => "last transition precedes the first staged one",
            SkipReason::WindowOverflow => "window is too long to measure in nanoseconds",
        };
        f.write_str(text)
    }
}

/// A record left out of the results, and why
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub push_id: String,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub windows: Vec<PushWindow>,
    pub skipped: Vec<SkippedRecord>,
}

impl PushRecord {
    pub fn window(&self) -> Result<PushWindow, SkipReason> {
        let last = self.states.last().ok_or(SkipReason::NoTransitions)?;
        let first_staged = self
            .states
            .iter()
            .find(|t| t.stage.as_deref().is_some_and(|s| !s.is_empty()))
            .ok_or(SkipReason::NoStagedTransition)?;

        let start_nsec = first_staged.start_time_nsec.ok_or(SkipReason::MissingStartTime)?;
        let end_nsec = last.start_time_nsec.ok_or(SkipReason::MissingStartTime)?;
        let end_state = last.state.ok_or(SkipReason::MissingState)?;
        if end_nsec < start_nsec {
            return Err(SkipReason::InvertedWindow);
        }
        end_nsec.checked_sub(start_nsec).ok_or(SkipReason::WindowOverflow)?;

        Ok(PushWindow {
            id: self.id.clone(),
            push_def: self.push_def.clone(),
            start_nsec,
            end_nsec,
            end_state,
        })
    }
}

/// Split records into measurable windows and skip diagnostics, keeping input order.
pub fn extract_windows(records: &[PushRecord]) -> Extraction {
    let mut out = Extraction::default();
    for record in records {
        match record.window() {
            Ok(window) => out.windows.push(window),
            Err(reason) => {
                tracing::warn!(push_id = %record.id, %reason, "Skipping push record");
                out.skipped.push(SkippedRecord {
                    push_id: record.id.clone(),
                    reason,
                });
            }
        }
    }
    out
}
