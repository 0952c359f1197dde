//! Error types for the enrichment-aggregate library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column '{column}' in {table}")]
    MissingColumn { column: String, table: String },

    #[error("Duplicate feature set name '{0}' in annotation")]
    DuplicateName(String),

    #[error("Feature set '{name}' has unrecognized features_path '{path}' (expected .txt, .bed or .csv)")]
    UnrecognizedKind { name: String, path: String },

    #[error("Invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber {
        value: String,
        column: String,
        row: usize,
    },

    #[error("Row {row} has {actual} fields, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Feature set not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EnrichError {
    /// True for errors caused by a table not having the expected shape.
    pub fn is_schema(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. }
                | Self::DuplicateName(_)
                | Self::UnrecognizedKind { .. }
                | Self::InvalidNumber { .. }
                | Self::RowLength { .. }
        )
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, EnrichError>;
