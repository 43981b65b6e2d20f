//! Checksum Error Types

use thiserror::Error;

/// Errors raised when resolving checksum algorithms
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    /// Algorithm name is not recognised
    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
