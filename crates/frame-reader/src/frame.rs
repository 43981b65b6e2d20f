//! Raw frame types

use serde::{Deserialize, Serialize};

/// Outcome of checking a candidate frame's trailing checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Checksum matches, or no checksum is configured
    Ok,
    /// Received and computed checksums differ
    ChecksumMismatch,
    /// The checksum bytes have not been fully received yet
    Incomplete,
}

/// One complete payload extracted from the stream, delimiters and
/// checksum stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFrame {
    payload: Vec<u8>,
    sequence: u64,
    timestamp_ms: u64,
    checksum_valid: bool,
}

impl RawFrame {
    pub(crate) fn new(payload: Vec<u8>, sequence: u64, checksum_valid: bool) -> Self {
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            payload,
            sequence,
            timestamp_ms,
            checksum_valid,
        }
    }

    /// Frame payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the payload
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Position of this frame in the reader's output, starting at 0
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Acceptance time in milliseconds since the UNIX epoch
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// True when the frame carried a checksum and it matched.
    /// False when no checksum algorithm is configured.
    pub fn checksum_valid(&self) -> bool {
        self.checksum_valid
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Payload as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let frame = RawFrame::new(b"42,17".to_vec(), 3, true);
        assert_eq!(frame.len(), 5);
        assert!(!frame.is_empty());
        assert_eq!(frame.sequence(), 3);
        assert!(frame.checksum_valid());
        assert!(frame.timestamp_ms() > 0);
        assert_eq!(frame.as_str(), Some("42,17"));
        assert_eq!(frame.into_payload(), b"42,17".to_vec());
    }

    #[test]
    fn test_binary_payload_is_not_text() {
        let frame = RawFrame::new(vec![0xFF, 0xFE], 0, false);
        assert!(frame.as_str().is_none());
        assert_eq!(frame.payload(), &[0xFF, 0xFE]);
    }
}
