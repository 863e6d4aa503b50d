//! Error types surfaced by the engine.

use thiserror::Error;

/// Fatal errors while building the catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read catalog source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid number {value:?} in column '{column}' at line {line}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },
}

/// Recoverable query errors. The caller should prompt for a new query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Please type a song name")]
    EmptyInput,

    #[error("No close matches found for {0:?}")]
    NoMatchFound(String),
}
