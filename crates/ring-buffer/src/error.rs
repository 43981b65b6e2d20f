//! Ring Buffer Error Types

use thiserror::Error;

/// Errors returned by [`RingBuffer`](crate::RingBuffer) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Request reaches past the buffered content
    #[error("Out of range: requested {requested} bytes, {available} buffered")]
    OutOfRange { requested: usize, available: usize },

    /// Append rejected by the overflow policy
    #[error("Buffer full: cannot append {requested} bytes, {available} free")]
    BufferFull { requested: usize, available: usize },

    /// Commit larger than the view that was handed out
    #[error("Invalid commit of {requested} bytes, contiguous run is {available}")]
    InvalidCommit { requested: usize, available: usize },
}
