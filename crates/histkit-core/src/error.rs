//! Error types for histogram construction and storage adoption
//!
//! Provides a unified error type for all histkit crates.

use thiserror::Error;

/// Core error type for histogram operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Axis definition that cannot be binned
    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    /// Storage holds a different number of cells than the axes describe
    #[error("Storage size mismatch: axes require {expected} cells, storage holds {actual}")]
    StorageSize { expected: usize, actual: usize },

    /// Adopted buffer does not satisfy the cell alignment
    #[error("Misaligned buffer: address {address:#x} is not aligned to {align} bytes")]
    Misaligned { address: usize, align: usize },

    /// Adopted buffer length is not a whole number of cells
    #[error("Buffer length {len} is not a multiple of the cell size {cell_size}")]
    BufferLength { len: usize, cell_size: usize },

    /// Storage cannot be re-laid out for a growing axis
    #[error("Growth unsupported: {0}")]
    GrowthUnsupported(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a storage/axes size mismatch
    pub fn storage_size(expected: usize, actual: usize) -> Self {
        Self::StorageSize { expected, actual }
    }

    /// Create an error for an axis option the axis kind cannot honour
    pub fn unsupported_option(axis: &str, option: &str) -> Self {
        Self::InvalidAxis(format!("{axis} axis does not support the {option} option"))
    }

    /// Create an error for storage that cannot grow
    pub fn growth_unsupported(storage: &str) -> Self {
        Self::GrowthUnsupported(format!("{storage} cannot be re-laid out for a growing axis"))
    }
}
