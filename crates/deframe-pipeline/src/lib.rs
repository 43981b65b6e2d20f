//! Deframing Pipeline
//!
//! Wires the ring buffer and frame reader behind tokio channels, loads
//! settings from file and environment, and exports frame counters through
//! the `metrics` facade.

pub mod error;
pub mod pipeline;
pub mod record;
pub mod settings;
pub mod source;

pub use error::PipelineError;
pub use pipeline::{FramePipeline, PipelineReport};
pub use record::FrameRecord;
pub use settings::{BufferSettings, PipelineSettings, ENV_PREFIX};
pub use source::{feed, DEFAULT_CHUNK_SIZE};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging to stderr. Unknown levels fall back to `info`.
pub fn init_logging(level: &str) -> Result<(), PipelineError> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| PipelineError::Logging(e.to_string()))
}
