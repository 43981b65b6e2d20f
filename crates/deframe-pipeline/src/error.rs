//! Pipeline Error Types

use thiserror::Error;

/// Errors raised while setting up or running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Settings could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Input could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Global tracing subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
