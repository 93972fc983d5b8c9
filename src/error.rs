//! Error types for the evaluator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Degenerate inputs to the ranking metrics.
///
/// These are programming or configuration errors, never expected runtime
/// conditions, so they are surfaced rather than coerced to 0 or NaN.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// Relevance and score vectors are not index-aligned.
    #[error("relevance vector has {relevance} entries but score vector has {scores}")]
    LengthMismatch { relevance: usize, scores: usize },

    /// Cutoff must be at least one.
    #[error("cutoff k must be positive")]
    ZeroCutoff,

    /// Nothing to rank.
    #[error("cannot evaluate an empty candidate universe")]
    EmptyInput,

    /// A relevance or score value was NaN or infinite.
    #[error("non-finite {field} value at position {index}")]
    NonFinite { field: &'static str, index: usize },

    /// A relevance value was negative.
    #[error("negative relevance {value} at position {index}")]
    NegativeRelevance { value: f64, index: usize },

    /// AUC has no positive class.
    #[error("AUC is undefined: no relevant items among {n} candidates")]
    NoRelevantItems { n: usize },

    /// AUC has no negative class.
    #[error("AUC is undefined: all {n} candidates are relevant")]
    AllRelevant { n: usize },
}

/// Errors that can occur while evaluating search output.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A scores or ground-truth file could not be parsed.
    #[error("Malformed input in '{path}': {reason}")]
    MalformedInput { path: PathBuf, reason: String },

    /// The tables directory does not exist or is not a directory.
    #[error("Corpus path '{0}' does not exist or is not a directory")]
    InvalidCorpusPath(PathBuf),

    /// No tables found in the corpus.
    #[error("No tables found in corpus at '{0}'")]
    EmptyCorpus(PathBuf),

    /// The report file does not exist.
    #[error("Report file not found at '{0}'")]
    ReportNotFound(PathBuf),

    /// Ground truth and candidate universe disagree, or the run is misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A worker task panicked or was cancelled.
    #[error("Evaluation task failed: {0}")]
    Task(String),

    /// Degenerate metric input.
    #[error("Metric computation error: {0}")]
    Metric(#[from] MetricError),
}

impl EvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error with path context.
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Serialization(err.to_string())
    }
}
