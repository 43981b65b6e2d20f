//! Byte Ring Buffer
//!
//! Fixed-capacity byte store used to accumulate transport chunks until the
//! frame reader can slice them. Supports destructive and non-destructive
//! reads, KMP pattern search across the wrap point, and zero-copy views.
//!
//! The buffer is single-owner: every mutating operation takes `&mut self`.
//! Sharing between an I/O thread and a processing thread belongs to the
//! embedding layer (a channel or a mutex around the whole buffer).

mod buffer;
mod error;
mod pattern;

pub use buffer::{BufferStats, OverflowPolicy, RingBuffer, DEFAULT_CAPACITY};
pub use error::BufferError;
pub use pattern::Pattern;
