//! Error types for kampus-core

use thiserror::Error;

/// Result type alias using kampus-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kampus-core infrastructure.
///
/// Shell behavior itself never fails; these only surface from the
/// persistence layer behind the first-launch flag.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),
}
