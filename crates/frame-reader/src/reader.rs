//! Frame Reader Implementation

use crate::config::{FrameDetectionMode, FrameReaderConfig, OperationMode};
use crate::frame::{RawFrame, ValidationStatus};
use ring_buffer::{BufferError, Pattern, RingBuffer};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Diagnostic counters, accumulated across extraction calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderStats {
    /// Frames handed to the caller
    pub frames_emitted: u64,
    /// Candidate frames dropped on checksum mismatch
    pub checksum_failures: u64,
    /// Empty or inverted candidates dropped
    pub empty_frames: u64,
    /// Bytes consumed without producing a frame
    pub bytes_discarded: u64,
}

/// Stateful frame extractor
pub struct FrameReader {
    /// Active configuration
    config: FrameReaderConfig,
    /// Trailing checksum bytes, derived from the algorithm
    checksum_length: usize,
    /// Compiled start delimiter
    start: Pattern,
    /// Compiled finish delimiter
    finish: Pattern,
    /// Sequence number of the next emitted frame
    sequence: u64,
    /// Diagnostic counters
    stats: ReaderStats,
}

impl FrameReader {
    /// Create a new frame reader
    pub fn new(config: FrameReaderConfig) -> Self {
        let mut reader = Self {
            config: FrameReaderConfig::default(),
            checksum_length: 0,
            start: Pattern::default(),
            finish: Pattern::default(),
            sequence: 0,
            stats: ReaderStats::default(),
        };
        reader.configure(config);
        reader
    }

    /// Replace the whole configuration
    pub fn configure(&mut self, config: FrameReaderConfig) {
        info!(
            "Configuring frame reader: {:?} / {:?}, checksum '{}'",
            config.operation_mode, config.frame_detection_mode, config.checksum_algorithm
        );
        self.start = Pattern::new(&config.start_sequence);
        self.finish = Pattern::new(&config.finish_sequence);
        self.config = config;
        self.refresh_checksum_length();
    }

    /// Set the operation mode. The checksum setting is kept; call
    /// [`set_checksum`](Self::set_checksum) with `""` to disable validation
    /// when leaving project-file mode.
    pub fn set_operation_mode(&mut self, mode: OperationMode) {
        self.config.operation_mode = mode;
    }

    /// Set the frame detection mode
    pub fn set_frame_detection_mode(&mut self, mode: FrameDetectionMode) {
        self.config.frame_detection_mode = mode;
    }

    /// Set the start delimiter
    pub fn set_start_sequence(&mut self, sequence: &[u8]) {
        self.config.start_sequence = sequence.to_vec();
        self.start = Pattern::new(sequence);
    }

    /// Set the finish delimiter
    pub fn set_finish_sequence(&mut self, sequence: &[u8]) {
        self.config.finish_sequence = sequence.to_vec();
        self.finish = Pattern::new(sequence);
    }

    /// Set the checksum algorithm by name. Unknown names disable validation.
    pub fn set_checksum(&mut self, algorithm: &str) {
        self.config.checksum_algorithm = algorithm.to_string();
        self.refresh_checksum_length();
    }

    fn refresh_checksum_length(&mut self) {
        let algorithm = &self.config.checksum_algorithm;
        if !checksum::is_supported(algorithm) {
            warn!(
                "Unsupported checksum algorithm '{}', frames will not be validated",
                algorithm
            );
        }
        self.checksum_length = checksum::length_of(algorithm);
    }

    /// Copy of the current configuration
    pub fn config(&self) -> FrameReaderConfig {
        self.config.clone()
    }

    /// Trailing checksum length in bytes
    pub fn checksum_length(&self) -> usize {
        self.checksum_length
    }

    /// Diagnostic counters
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Reset diagnostic counters (the sequence counter is kept)
    pub fn reset_stats(&mut self) {
        self.stats = ReaderStats::default();
    }

    /// Extract every complete frame currently in `buffer`, consuming the
    /// bytes that belong to emitted or discarded frames. Incomplete data is
    /// left in place for the next call.
    pub fn extract_frames(&mut self, buffer: &mut RingBuffer) -> Vec<RawFrame> {
        let mut frames = Vec::new();

        let result = match (self.config.operation_mode, self.config.frame_detection_mode) {
            (OperationMode::ProjectFile, FrameDetectionMode::NoDelimiters) => {
                self.drain_all(buffer, &mut frames);
                Ok(())
            }
            (OperationMode::QuickPlot, _)
            | (OperationMode::ProjectFile, FrameDetectionMode::EndDelimiterOnly) => {
                self.read_end_delimited_frames(buffer, &mut frames)
            }
            (OperationMode::DeviceJson, _)
            | (OperationMode::ProjectFile, FrameDetectionMode::StartAndEndDelimiter) => {
                self.read_start_end_delimited_frames(buffer, &mut frames)
            }
            (OperationMode::ProjectFile, FrameDetectionMode::StartDelimiterOnly) => {
                self.read_start_delimited_frames(buffer, &mut frames)
            }
        };

        if let Err(e) = result {
            // Offsets are derived from the buffer itself, so this means a bug
            error!("Frame extraction stopped: {}", e);
        }

        frames
    }

    /// No delimiters: everything buffered is one frame
    fn drain_all(&mut self, buffer: &mut RingBuffer, frames: &mut Vec<RawFrame>) {
        if buffer.is_empty() {
            return;
        }
        let payload = buffer.to_vec();
        buffer.consume(payload.len());
        self.emit(payload, frames);
    }

    /// Earliest end delimiter as `(index, delimiter length)`
    fn find_end_delimiter(&self, buffer: &RingBuffer) -> Option<(usize, usize)> {
        if self.config.operation_mode == OperationMode::QuickPlot {
            // `\n`, `\r` or `\r\n`, whichever starts first
            let index = buffer.position(0, |b| b == b'\n' || b == b'\r')?;
            let crlf = buffer.at(index).ok() == Some(b'\r')
                && buffer.at(index + 1).ok() == Some(b'\n');
            Some((index, if crlf { 2 } else { 1 }))
        } else {
            buffer
                .find_compiled(&self.finish, 0)
                .map(|index| (index, self.finish.len()))
        }
    }

    /// Frames terminated by an end delimiter, checksum after the delimiter
    fn read_end_delimited_frames(
        &mut self,
        buffer: &mut RingBuffer,
        frames: &mut Vec<RawFrame>,
    ) -> Result<(), BufferError> {
        while let Some((end, delimiter_len)) = self.find_end_delimiter(buffer) {
            let crc_position = end + delimiter_len;
            let frame_end = crc_position + self.checksum_length;

            if end == 0 {
                if !self.discard_empty(buffer, frame_end) {
                    break;
                }
                continue;
            }

            let payload = buffer.copy_range(0, end)?;
            match self.validate(&payload, buffer, crc_position)? {
                ValidationStatus::Ok => self.accept(payload, buffer, frame_end, frames),
                ValidationStatus::Incomplete => break,
                ValidationStatus::ChecksumMismatch => self.discard(buffer, frame_end),
            }
        }
        Ok(())
    }

    /// Frames separated by consecutive start delimiters, checksum at the
    /// end of each frame
    fn read_start_delimited_frames(
        &mut self,
        buffer: &mut RingBuffer,
        frames: &mut Vec<RawFrame>,
    ) -> Result<(), BufferError> {
        while let Some(start_index) = buffer.find_compiled(&self.start, 0) {
            let frame_start = start_index + self.start.len();

            let frame_end = match buffer.find_compiled(&self.start, frame_start) {
                Some(next_start) => next_start,
                None => {
                    // Last frame in the stream: take the rest only once it
                    // can hold a checksum and at least one payload byte
                    if buffer.len() - frame_start <= self.checksum_length {
                        break;
                    }
                    buffer.len()
                }
            };

            let frame_length = frame_end - frame_start;
            if frame_length <= self.checksum_length {
                self.discard_empty(buffer, frame_end);
                continue;
            }

            let crc_position = frame_end - self.checksum_length;
            let payload = buffer.copy_range(frame_start, crc_position - frame_start)?;
            match self.validate(&payload, buffer, crc_position)? {
                ValidationStatus::Ok => self.accept(payload, buffer, frame_end, frames),
                ValidationStatus::Incomplete => break,
                ValidationStatus::ChecksumMismatch => self.discard(buffer, frame_end),
            }
        }
        Ok(())
    }

    /// Frames bracketed by start and finish delimiters, checksum after the
    /// finish delimiter
    fn read_start_end_delimited_frames(
        &mut self,
        buffer: &mut RingBuffer,
        frames: &mut Vec<RawFrame>,
    ) -> Result<(), BufferError> {
        while let Some(finish_index) = buffer.find_compiled(&self.finish, 0) {
            let finish_end = finish_index + self.finish.len();

            let frame_start = match buffer.find_compiled(&self.start, 0) {
                Some(start_index) if start_index < finish_index => start_index + self.start.len(),
                _ => {
                    // Finish without a preceding start is noise: resync past it
                    debug!("Finish delimiter without start at offset {}", finish_index);
                    self.discard(buffer, finish_end);
                    continue;
                }
            };

            if frame_start >= finish_index {
                self.discard_empty(buffer, finish_end);
                continue;
            }

            let frame_end = finish_end + self.checksum_length;
            let payload = buffer.copy_range(frame_start, finish_index - frame_start)?;
            match self.validate(&payload, buffer, finish_end)? {
                ValidationStatus::Ok => self.accept(payload, buffer, frame_end, frames),
                ValidationStatus::Incomplete => break,
                ValidationStatus::ChecksumMismatch => self.discard(buffer, frame_end),
            }
        }
        Ok(())
    }

    /// Check the checksum stored at `crc_position` against `payload`
    fn validate(
        &mut self,
        payload: &[u8],
        buffer: &RingBuffer,
        crc_position: usize,
    ) -> Result<ValidationStatus, BufferError> {
        if self.checksum_length == 0 {
            return Ok(ValidationStatus::Ok);
        }

        if buffer.len() < crc_position + self.checksum_length {
            return Ok(ValidationStatus::Incomplete);
        }

        let received = buffer.copy_range(crc_position, self.checksum_length)?;
        let calculated = checksum::compute(&self.config.checksum_algorithm, payload, None);
        if calculated == received {
            return Ok(ValidationStatus::Ok);
        }

        self.stats.checksum_failures += 1;
        warn!(
            "Checksum failed: algorithm={}, received={}, calculated={}, frame={}",
            self.config.checksum_algorithm,
            hex(&received),
            hex(&calculated),
            hex(payload)
        );
        Ok(ValidationStatus::ChecksumMismatch)
    }

    /// Emit `payload` and consume the frame's bytes
    fn accept(
        &mut self,
        payload: Vec<u8>,
        buffer: &mut RingBuffer,
        frame_end: usize,
        frames: &mut Vec<RawFrame>,
    ) {
        buffer.consume(frame_end);
        self.emit(payload, frames);
    }

    fn emit(&mut self, payload: Vec<u8>, frames: &mut Vec<RawFrame>) {
        let checksum_valid = self.checksum_length > 0;
        frames.push(RawFrame::new(payload, self.sequence, checksum_valid));
        self.sequence += 1;
        self.stats.frames_emitted += 1;
    }

    /// Drop the first `count` bytes as a rejected candidate
    fn discard(&mut self, buffer: &mut RingBuffer, count: usize) {
        let dropped = buffer.consume(count);
        self.stats.bytes_discarded += dropped as u64;
        debug!("Discarded {} bytes", dropped);
    }

    /// Drop an empty candidate once all of its bytes are buffered. Returns
    /// false (and keeps the bytes) if they are not all here yet.
    fn discard_empty(&mut self, buffer: &mut RingBuffer, count: usize) -> bool {
        if buffer.len() < count {
            return false;
        }
        self.stats.empty_frames += 1;
        self.discard(buffer, count);
        true
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new(FrameReaderConfig::default())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
