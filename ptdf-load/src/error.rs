//! Error types for ptdf-load

use crate::db::StoreError;
use ptdf_common::grammar::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Loader error type
#[derive(Debug, Error)]
pub enum LoadError {
    /// Store rejected a batch with a non-overflow failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// ptdf-common error (configuration, schema setup)
    #[error("Common error: {0}")]
    Common(#[from] ptdf_common::Error),

    /// IO error while reading a data file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data file absent from the data directory
    #[error("Source file not found: {}", .0.display())]
    MissingSource(PathBuf),

    /// Key or record outside the data file grammar
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result type for loader operations
pub type LoadResult<T> = Result<T, LoadError>;
