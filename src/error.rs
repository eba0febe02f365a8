/// Row packing errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("interval '{id}' ends before it starts")]
    InvertedInterval { id: String },

    #[error("interval '{id}' has a non-finite timestamp")]
    NonFiniteTime { id: String },
}

/// Empirical distribution errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DistributionError {
    #[error("duration table is empty")]
    EmptyDataset,

    #[error("probability {probability} outside [0, {max}]")]
    OutOfRange { probability: f64, max: f64 },

    #[error("duration values must be finite and non-negative")]
    NonFiniteDuration,

    #[error("samples are not sorted by duration and probability")]
    Unsorted,

    #[error("interpolation failed: {0}")]
    Interpolation(String),
}

/// Cache and file errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown probability scale '{0}'")]
    UnknownScale(String),

    #[error("cached table is invalid: {0}")]
    Distribution(#[from] DistributionError),
}
