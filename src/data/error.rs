use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while producing, loading or querying a results table.
///
/// Every variant is fatal for the chart that triggered it. The only condition
/// the engine absorbs is a shape mismatch in [`ratio`](super::series::ratio),
/// which is reported through [`RatioOutcome`](super::series::RatioOutcome)
/// instead of this type.
#[derive(Debug, Error)]
pub enum DataError {
    /// The table file does not exist, even after running the generator.
    #[error("results table for dataset '{dataset}' not found at {}", path.display())]
    MissingArtifact { dataset: String, path: PathBuf },

    /// The file could not be parsed as a table (no header row, ragged rows, …).
    #[error("malformed results table {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// A cell in a numeric column could not be read as a number.
    #[error("{}: column '{column}', row {row}: '{value}' is not numeric", path.display())]
    NonNumeric {
        path: PathBuf,
        column: String,
        row: usize,
        value: String,
    },

    /// A query referenced a column the table does not have.
    #[error("{}: no column named '{column}'", path.display())]
    UnknownColumn { path: PathBuf, column: String },

    /// Filter columns and values were given as sequences of different length.
    #[error("filter has {columns} columns but {values} values")]
    FilterArity { columns: usize, values: usize },

    /// Two series had to be combined position by position but differ in length.
    #[error("cannot combine series of length {left} and {right}")]
    LengthMismatch { left: usize, right: usize },
}

impl DataError {
    /// Shorthand for a [`DataError::Format`].
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DataError::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
