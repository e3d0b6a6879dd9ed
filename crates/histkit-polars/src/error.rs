//! Error types for histkit-polars

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Histogram error: {0}")]
    Histogram(#[from] histkit_core::Error),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Type mismatch in column {column}: expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    #[error("Null value in column {column} at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Value in column {column} at row {row} cannot be read exactly as {target}")]
    LossyConversion {
        column: String,
        row: usize,
        target: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Action {0} has not been executed")]
    NotExecuted(String),
}

pub type Result<T> = std::result::Result<T, Error>;
