// Error taxonomy for the analysis core.
//
// Malformed registry input (missing keys, unparsable numbers, bad filenames)
// is never an error here: extracts are known to be inconsistently formatted,
// so those rows are skipped with a log line. Errors are reserved for the two
// cases a caller must handle explicitly: not enough data to analyze, and
// outright contract violations.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// No uploaded file produced a single usable data row.
    #[error("no input file produced any usable rows")]
    NoUsableData,

    /// Clustering was requested with fewer qualifying events than clusters.
    #[error("not enough data for clustering: {available} qualifying events, need at least {required}")]
    NotEnoughData { available: usize, required: usize },

    /// Caller bug: a cluster count of zero can never partition anything.
    #[error("cluster count must be positive, got {0}")]
    InvalidClusterCount(usize),

    /// Caller bug: feature vectors of different lengths were compared.
    #[error("feature vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
