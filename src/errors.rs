use std::path::PathBuf;
use thiserror::Error;

use crate::types::Label;

/// Failures while discovering and reading station files
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No .{extension} files found under {root}")]
    NoInputFiles { root: PathBuf, extension: String },
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path} row {row}: invalid speed '{value}'")]
    InvalidSpeed {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("{path} row {row}: invalid intent '{value}' (expected 0, 1 or 2)")]
    InvalidIntent {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

/// Failures of the threshold sweep itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    #[error("No observations to sweep")]
    EmptyDataset,
    /// A rate denominator is zero because one class never occurs.
    #[error("Degenerate rate: dataset has no {} observations", .missing.as_str())]
    DegenerateRate { missing: Label },
}
