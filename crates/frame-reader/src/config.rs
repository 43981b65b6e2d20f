//! Frame reader configuration

use serde::{Deserialize, Serialize};

/// How the byte stream is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationMode {
    /// Line-oriented data, any of `\n`, `\r`, `\r\n` ends a frame
    #[default]
    QuickPlot,
    /// Payloads bracketed by explicit start and finish markers
    #[serde(alias = "devicejson")]
    DeviceJson,
    /// Framing described by the project's detection mode
    ProjectFile,
}

/// Delimiter strategy used in [`OperationMode::ProjectFile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameDetectionMode {
    /// The whole buffer is one frame
    #[serde(rename = "no-delimiters")]
    NoDelimiters,
    /// Frames end with the finish sequence
    #[default]
    #[serde(rename = "end-delimiter")]
    EndDelimiterOnly,
    /// Frames are separated by consecutive start sequences
    #[serde(rename = "start-delimiter")]
    StartDelimiterOnly,
    /// Frames are bracketed by start and finish sequences
    #[serde(rename = "start-end-delimiter")]
    StartAndEndDelimiter,
}

/// Frame reader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameReaderConfig {
    /// Operation mode
    pub operation_mode: OperationMode,
    /// Detection mode (only read in project-file mode)
    pub frame_detection_mode: FrameDetectionMode,
    /// Start delimiter bytes
    #[serde(with = "delimiter")]
    pub start_sequence: Vec<u8>,
    /// Finish delimiter bytes
    #[serde(with = "delimiter")]
    pub finish_sequence: Vec<u8>,
    /// Checksum algorithm name, empty for none
    pub checksum_algorithm: String,
}

impl Default for FrameReaderConfig {
    fn default() -> Self {
        Self {
            operation_mode: OperationMode::QuickPlot,
            frame_detection_mode: FrameDetectionMode::EndDelimiterOnly,
            start_sequence: Vec::new(),
            finish_sequence: Vec::new(),
            checksum_algorithm: String::new(),
        }
    }
}

impl FrameReaderConfig {
    /// Line-oriented plotting config
    pub fn quick_plot() -> Self {
        Self::default()
    }

    /// Start/finish bracketed payloads
    pub fn device_json(start: &[u8], finish: &[u8]) -> Self {
        Self {
            operation_mode: OperationMode::DeviceJson,
            start_sequence: start.to_vec(),
            finish_sequence: finish.to_vec(),
            ..Default::default()
        }
    }

    /// Project-file framing with the given detection mode
    pub fn project_file(mode: FrameDetectionMode) -> Self {
        Self {
            operation_mode: OperationMode::ProjectFile,
            frame_detection_mode: mode,
            ..Default::default()
        }
    }

    /// Builder: set the start delimiter
    pub fn with_start(mut self, start: &[u8]) -> Self {
        self.start_sequence = start.to_vec();
        self
    }

    /// Builder: set the finish delimiter
    pub fn with_finish(mut self, finish: &[u8]) -> Self {
        self.finish_sequence = finish.to_vec();
        self
    }

    /// Builder: set the checksum algorithm
    pub fn with_checksum(mut self, algorithm: &str) -> Self {
        self.checksum_algorithm = algorithm.to_string();
        self
    }

    /// Trailing checksum bytes implied by the configured algorithm
    pub fn checksum_length(&self) -> usize {
        checksum::length_of(&self.checksum_algorithm)
    }
}

/// Delimiters deserialize from either a string (`"\r\n"`) or a byte
/// array (`[2, 3]`). Valid UTF-8 serializes back as a string.
mod delimiter {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(bytes) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => bytes.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.into_bytes(),
            Repr::Bytes(bytes) => bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_length_is_derived() {
        let config = FrameReaderConfig::project_file(FrameDetectionMode::EndDelimiterOnly)
            .with_checksum("crc16");
        assert_eq!(config.checksum_length(), 2);
        assert_eq!(FrameReaderConfig::default().checksum_length(), 0);
        assert_eq!(FrameReaderConfig::default().with_checksum("nope").checksum_length(), 0);
    }

    #[test]
    fn test_deserialize_string_and_byte_delimiters() {
        let json = r#"{
            "operation_mode": "project-file",
            "frame_detection_mode": "start-end-delimiter",
            "start_sequence": [2],
            "finish_sequence": "\r\n",
            "checksum_algorithm": "CRC-8"
        }"#;
        let config: FrameReaderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.operation_mode, OperationMode::ProjectFile);
        assert_eq!(
            config.frame_detection_mode,
            FrameDetectionMode::StartAndEndDelimiter
        );
        assert_eq!(config.start_sequence, vec![0x02]);
        assert_eq!(config.finish_sequence, b"\r\n".to_vec());
        assert_eq!(config.checksum_length(), 1);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: FrameReaderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FrameReaderConfig::default());
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = FrameReaderConfig::device_json(b"/*", b"*/");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""start_sequence":"/*""#));
        let back: FrameReaderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let binary = FrameReaderConfig::default().with_start(&[0xFF, 0xFE]);
        let json = serde_json::to_string(&binary).unwrap();
        assert!(json.contains("[255,254]"));
    }
}
