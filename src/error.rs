//! Error types for the dosebandit library.

use thiserror::Error;

/// Result type alias for bandit operations.
pub type Result<T> = std::result::Result<T, BanditError>;

/// Errors that can occur while encoding trials, choosing doses or running
/// an evaluation.
#[derive(Error, Debug)]
pub enum BanditError {
    /// A feature required by a policy is absent from the trial.
    #[error("missing feature: {name}")]
    MissingFeature { name: String },

    /// An arm name outside the closed dose-class set.
    #[error("unknown arm: {name}")]
    UnknownArm { name: String },

    /// Mismatch in the dimensions of input data.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Numerical computation error.
    #[error("numerical error: {message}")]
    NumericalError { message: String },

    /// The dataset holds no trials.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Malformed dataset or results file.
    #[error("data error at row {row}: {message}")]
    Data { row: usize, message: String },

    /// Reading or writing a CSV file failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering the results figure failed.
    #[error("plot error: {message}")]
    Plot { message: String },
}
