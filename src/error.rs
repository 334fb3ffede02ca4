//! Error types for efficient-frontier.

use thiserror::Error;

/// Error type for efficient-frontier operations.
#[derive(Debug, Error)]
pub enum FrontierError {
    /// Not enough periods to estimate a covariance matrix.
    #[error("Insufficient data: need at least {required} periods, got {got}")]
    InsufficientData { required: usize, got: usize },

    /// A caller-supplied parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Vector or matrix dimensions do not match the asset universe.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// No weight vector satisfies the constraints.
    #[error("Infeasible constraints: {0}")]
    InfeasibleConstraint(String),

    /// An iterative routine hit its iteration cap.
    #[error("Did not converge after {iterations} iterations: {context}")]
    Convergence { iterations: u32, context: String },

    /// Solver error.
    #[error("Solver error: {0}")]
    SolverError(String),

    /// Numerical error.
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Malformed input data.
    #[error("Data error: {0}")]
    DataError(String),

    /// A date cell that does not match the configured format.
    #[error("Date parse error on line {line}: '{value}': {source}")]
    DateParse {
        line: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),
}

/// Result type for efficient-frontier operations.
pub type Result<T> = std::result::Result<T, FrontierError>;
