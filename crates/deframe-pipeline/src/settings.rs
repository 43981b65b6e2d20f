//! Pipeline settings
//!
//! Loaded from an optional TOML file, then overridden by `DEFRAME__*`
//! environment variables (`DEFRAME__READER__CHECKSUM_ALGORITHM=crc8`).

use crate::error::PipelineError;
use config::Config as ConfigLoader;
use frame_reader::FrameReaderConfig;
use ring_buffer::OverflowPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DEFRAME";

/// Ring buffer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    /// Initial capacity in bytes
    pub capacity: usize,
    /// Behaviour when a chunk does not fit
    pub overflow: OverflowPolicy,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            capacity: 64 * 1024,
            overflow: OverflowPolicy::Reject,
        }
    }
}

/// Top-level pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Ring buffer settings
    pub buffer: BufferSettings,
    /// Frame reader configuration
    pub reader: FrameReaderConfig,
    /// Bound of the chunk and frame channels
    pub channel_capacity: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            buffer: BufferSettings::default(),
            reader: FrameReaderConfig::default(),
            channel_capacity: 256,
            log_level: "info".to_string(),
        }
    }
}

impl PipelineSettings {
    /// Load settings from `path` (if given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = ConfigLoader::builder();
        if let Some(path) = path {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_reader::{FrameDetectionMode, OperationMode};

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.buffer.overflow, OverflowPolicy::Reject);
        assert_eq!(settings.reader.operation_mode, OperationMode::QuickPlot);
        assert_eq!(settings.channel_capacity, 256);
    }

    #[test]
    fn test_load_from_toml() {
        let path = write_temp(
            "deframe-settings",
            r#"
channel_capacity = 8

[buffer]
capacity = 512
overflow = "grow"

[reader]
operation_mode = "project-file"
frame_detection_mode = "end-delimiter"
finish_sequence = "\n"
checksum_algorithm = "crc8"
"#,
        );

        let settings = PipelineSettings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.channel_capacity, 8);
        assert_eq!(settings.buffer.capacity, 512);
        assert_eq!(settings.buffer.overflow, OverflowPolicy::Grow);
        assert_eq!(settings.reader.operation_mode, OperationMode::ProjectFile);
        assert_eq!(
            settings.reader.frame_detection_mode,
            FrameDetectionMode::EndDelimiterOnly
        );
        assert_eq!(settings.reader.finish_sequence, b"\n".to_vec());
        assert_eq!(settings.reader.checksum_length(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("deframe-does-not-exist.toml");
        assert!(matches!(
            PipelineSettings::load(Some(&path)),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("DEFRAME__LOG_LEVEL", "debug");
        let settings = PipelineSettings::load(None).unwrap();
        std::env::remove_var("DEFRAME__LOG_LEVEL");
        assert_eq!(settings.log_level, "debug");
    }
}
