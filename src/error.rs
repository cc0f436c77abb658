//! Error types.

use thiserror::Error;

/// Errors that can occur while navigating history or decoding automatons.
#[derive(Debug, Error)]
pub enum Error {
    /// The history already holds as many snapshots as it may.
    #[error("maximum history size, can't store more steps: {capacity}")]
    HistoryFull { capacity: usize },

    /// A history position outside `0..len` was requested.
    #[error("history index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// Serialized grid references a state missing from the state list.
    #[error("unknown state: {0:?}")]
    UnknownState(String),

    /// Grid data does not fit the declared shape.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// No edge rule goes by this name.
    #[error("unknown edge rule: {0:?}")]
    UnknownEdgeRule(String),

    /// Serialized grid size is empty or has a zero extent.
    #[error("invalid grid size: {0:?}")]
    InvalidGridSize(Vec<usize>),

    /// A runner can't pace itself at this rate.
    #[error("invalid iteration rate: {0}")]
    InvalidRate(f64),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "binary")]
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
