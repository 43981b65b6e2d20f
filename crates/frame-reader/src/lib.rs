//! Frame Reader
//!
//! Slices a buffered byte stream into discrete frames using one of four
//! delimiter strategies, validating trailing checksums along the way.
//!
//! A [`FrameReader`] is driven by calling [`FrameReader::extract_frames`]
//! whenever new bytes have been appended to its [`RingBuffer`]:
//!
//! ```
//! use frame_reader::{FrameDetectionMode, FrameReader, FrameReaderConfig};
//! use ring_buffer::RingBuffer;
//!
//! let config = FrameReaderConfig::project_file(FrameDetectionMode::EndDelimiterOnly)
//!     .with_finish(b";");
//! let mut reader = FrameReader::new(config);
//! let mut buffer = RingBuffer::new(64);
//!
//! buffer.append(b"temp=21;hum=40;te").unwrap();
//! let frames = reader.extract_frames(&mut buffer);
//! assert_eq!(frames.len(), 2);
//! assert_eq!(frames[1].payload(), b"hum=40");
//! assert_eq!(buffer.to_vec(), b"te");
//! ```

mod config;
mod frame;
mod reader;

pub use config::{FrameDetectionMode, FrameReaderConfig, OperationMode};
pub use frame::{RawFrame, ValidationStatus};
pub use reader::{FrameReader, ReaderStats};

pub use ring_buffer::RingBuffer;
