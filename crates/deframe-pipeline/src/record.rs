//! JSON output records

use frame_reader::RawFrame;
use serde::Serialize;
use std::fmt::Write;

/// One emitted frame, ready for serialization as a JSON line.
///
/// UTF-8 payloads are carried as `text`, anything else as lowercase `hex`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub len: usize,
    pub checksum_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
}

impl From<&RawFrame> for FrameRecord {
    fn from(frame: &RawFrame) -> Self {
        let (text, hex) = match frame.as_str() {
            Some(s) => (Some(s.to_string()), None),
            None => (None, Some(to_hex(frame.payload()))),
        };
        Self {
            sequence: frame.sequence(),
            timestamp_ms: frame.timestamp_ms(),
            len: frame.len(),
            checksum_valid: frame.checksum_valid(),
            text,
            hex,
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_reader::{FrameDetectionMode, FrameReader, FrameReaderConfig};
    use ring_buffer::RingBuffer;

    fn frames(config: FrameReaderConfig, bytes: &[u8]) -> Vec<RawFrame> {
        let mut reader = FrameReader::new(config);
        let mut buffer = RingBuffer::new(64);
        buffer.append(bytes).unwrap();
        reader.extract_frames(&mut buffer)
    }

    #[test]
    fn test_text_record() {
        let frames = frames(FrameReaderConfig::quick_plot(), b"1,2,3\n");
        let record = FrameRecord::from(&frames[0]);
        assert_eq!(record.text.as_deref(), Some("1,2,3"));
        assert!(record.hex.is_none());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["len"], 5);
        assert!(json.get("hex").is_none());
    }

    #[test]
    fn test_binary_record_is_hex() {
        let config = FrameReaderConfig::project_file(FrameDetectionMode::EndDelimiterOnly)
            .with_finish(&[0x7E]);
        let frames = frames(config, &[0xFF, 0x00, 0xAB, 0x7E]);
        let record = FrameRecord::from(&frames[0]);
        assert_eq!(record.hex.as_deref(), Some("ff00ab"));
        assert!(record.text.is_none());
        assert!(!record.checksum_valid);
    }
}
