//! Ring Buffer Implementation

use crate::error::BufferError;
use crate::pattern::Pattern;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default buffer capacity (10 MiB)
pub const DEFAULT_CAPACITY: usize = 10 * 1024 * 1024;

/// What `append` does when a chunk does not fit in the free space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail with [`BufferError::BufferFull`] and leave the content untouched
    #[default]
    Reject,
    /// Enlarge the storage (at least doubling) so the chunk fits
    Grow,
    /// Drop the oldest bytes to make room
    OverwriteOldest,
}

/// Snapshot of buffer occupancy for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStats {
    pub size: usize,
    pub capacity: usize,
    pub free_space: usize,
    pub head: usize,
    pub tail: usize,
    pub utilization_percent: f64,
    /// Content straddles the end of the storage
    pub wrapped: bool,
}

/// Fixed-capacity byte ring buffer
pub struct RingBuffer {
    /// Pre-allocated storage, its length is the capacity
    storage: Box<[u8]>,
    /// Physical index of the oldest byte
    head: usize,
    /// Physical index of the next write
    tail: usize,
    /// Bytes currently held
    size: usize,
    /// Overflow behaviour of `append`
    policy: OverflowPolicy,
    /// Total bytes accepted (for statistics)
    total_written: u64,
    /// Total bytes lost to overwrites and shrinking resizes
    total_dropped: u64,
}

impl RingBuffer {
    /// Create a buffer that rejects overflowing appends
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, OverflowPolicy::Reject)
    }

    /// Create a buffer with an explicit overflow policy
    pub fn with_policy(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            size: 0,
            policy,
            total_written: 0,
            total_dropped: 0,
        }
    }

    /// Create a buffer with default capacity (10 MiB)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes that can be appended without overflowing
    pub fn free_space(&self) -> usize {
        self.capacity() - self.size
    }

    /// Get the overflow policy
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Change the overflow policy
    pub fn set_policy(&mut self, policy: OverflowPolicy) {
        self.policy = policy;
    }

    /// Get total bytes written (for statistics)
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Get total bytes dropped by overwrite or shrink
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped
    }

    /// Map an offset in `0..2 * capacity` back into the storage
    #[inline]
    fn wrap(&self, index: usize) -> usize {
        let capacity = self.capacity();
        if index >= capacity {
            index - capacity
        } else {
            index
        }
    }

    /// Buffered content as two slices, oldest first. The second is empty
    /// unless the content wraps.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        if self.size == 0 {
            return (&[], &[]);
        }
        let first = self.size.min(self.capacity() - self.head);
        (
            &self.storage[self.head..self.head + first],
            &self.storage[..self.size - first],
        )
    }

    /// Append bytes at the tail, applying the overflow policy if they do
    /// not fit.
    pub fn append(&mut self, data: &[u8]) -> Result<(), BufferError> {
        if data.is_empty() {
            return Ok(());
        }

        if data.len() <= self.free_space() {
            self.write_unchecked(data);
            return Ok(());
        }

        match self.policy {
            OverflowPolicy::Reject => Err(BufferError::BufferFull {
                requested: data.len(),
                available: self.free_space(),
            }),
            OverflowPolicy::Grow => {
                let required = self.size + data.len();
                let new_capacity = required.max(self.capacity().saturating_mul(2));
                debug!(
                    "Growing ring buffer from {} to {} bytes",
                    self.capacity(),
                    new_capacity
                );
                self.set_capacity(new_capacity);
                self.write_unchecked(data);
                Ok(())
            }
            OverflowPolicy::OverwriteOldest => {
                let capacity = self.capacity();
                let mut src = data;

                // Only the newest `capacity` bytes of an oversized chunk survive
                if src.len() > capacity {
                    let skipped = src.len() - capacity;
                    self.total_dropped += skipped as u64;
                    src = &src[skipped..];
                }
                if src.is_empty() {
                    return Ok(());
                }

                let overwrite = src.len().saturating_sub(self.free_space());
                if overwrite > 0 {
                    warn!("Ring buffer full, overwriting {} oldest bytes", overwrite);
                    self.head = self.wrap(self.head + overwrite);
                    self.size -= overwrite;
                    self.total_dropped += overwrite as u64;
                }
                self.write_unchecked(src);
                Ok(())
            }
        }
    }

    /// Copy `data` at the tail. Caller guarantees it fits.
    fn write_unchecked(&mut self, data: &[u8]) {
        let len = data.len();
        let first = len.min(self.capacity() - self.tail);
        self.storage[self.tail..self.tail + first].copy_from_slice(&data[..first]);
        self.storage[..len - first].copy_from_slice(&data[first..]);
        self.tail = self.wrap(self.tail + len);
        self.size += len;
        self.total_written += len as u64;
    }

    /// Drop `count` bytes from the head. Caller guarantees `count <= size`.
    fn advance(&mut self, count: usize) {
        self.head = self.wrap(self.head + count);
        self.size -= count;
    }

    /// Copy `len` bytes starting at logical offset `start`
    pub fn copy_range(&self, start: usize, len: usize) -> Result<Vec<u8>, BufferError> {
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.size)
            .ok_or(BufferError::OutOfRange {
                requested: start.saturating_add(len),
                available: self.size,
            })?;

        let (a, b) = self.as_slices();
        let mut out = Vec::with_capacity(len);
        if start < a.len() {
            out.extend_from_slice(&a[start..end.min(a.len())]);
        }
        if end > a.len() {
            let from = start.saturating_sub(a.len());
            out.extend_from_slice(&b[from..end - a.len()]);
        }
        Ok(out)
    }

    /// Copy the first `count` bytes without consuming them
    pub fn peek(&self, count: usize) -> Result<Vec<u8>, BufferError> {
        self.copy_range(0, count)
    }

    /// Copy and consume the first `count` bytes
    pub fn read(&mut self, count: usize) -> Result<Vec<u8>, BufferError> {
        let data = self.copy_range(0, count)?;
        self.advance(count);
        Ok(data)
    }

    /// Discard up to `count` bytes from the head, returning how many were
    /// discarded
    pub fn consume(&mut self, count: usize) -> usize {
        let count = count.min(self.size);
        self.advance(count);
        count
    }

    /// Byte at logical `index` (0 is the oldest byte)
    pub fn at(&self, index: usize) -> Result<u8, BufferError> {
        if index >= self.size {
            return Err(BufferError::OutOfRange {
                requested: index.saturating_add(1),
                available: self.size,
            });
        }
        Ok(self.storage[self.wrap(self.head + index)])
    }

    /// Borrow the first `count` bytes if they are contiguous in storage
    pub fn peek_contiguous(&self, count: usize) -> Option<&[u8]> {
        let view = self.read_view();
        (count <= view.len()).then(|| &view[..count])
    }

    /// Copy the whole content out, oldest first
    pub fn to_vec(&self) -> Vec<u8> {
        let (a, b) = self.as_slices();
        let mut out = Vec::with_capacity(self.size);
        out.extend_from_slice(a);
        out.extend_from_slice(b);
        out
    }

    /// Reset to empty without releasing storage
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.size = 0;
    }

    /// Resize the storage, keeping as many of the oldest bytes as fit
    pub fn set_capacity(&mut self, capacity: usize) {
        let keep = self.size.min(capacity);
        let mut storage = vec![0u8; capacity].into_boxed_slice();

        let (a, b) = self.as_slices();
        let from_a = a.len().min(keep);
        storage[..from_a].copy_from_slice(&a[..from_a]);
        storage[from_a..keep].copy_from_slice(&b[..keep - from_a]);

        if keep < self.size {
            warn!(
                "Shrinking ring buffer to {} bytes dropped {} buffered bytes",
                capacity,
                self.size - keep
            );
            self.total_dropped += (self.size - keep) as u64;
        }

        self.storage = storage;
        self.head = 0;
        self.size = keep;
        self.tail = if keep == capacity { 0 } else { keep };
    }

    /// Find the first occurrence of `pattern` at or after logical offset
    /// `start`. Builds the failure table on every call; use
    /// [`find_compiled`](Self::find_compiled) on hot paths.
    pub fn find_pattern(&self, pattern: &[u8], start: usize) -> Option<usize> {
        if pattern.is_empty() || self.size < pattern.len() {
            return None;
        }
        self.find_compiled(&Pattern::new(pattern), start)
    }

    /// KMP search with a precompiled pattern, O(size + pattern length).
    /// Matches that straddle the physical wrap point are found.
    pub fn find_compiled(&self, pattern: &Pattern, start: usize) -> Option<usize> {
        let m = pattern.len();
        if m == 0 || start >= self.size || self.size - start < m {
            return None;
        }

        let (a, b) = self.as_slices();
        let (first, second) = if start < a.len() {
            (&a[start..], b)
        } else {
            (&[][..], &b[start - a.len()..])
        };

        let mut matched = 0;
        for (offset, &byte) in first.iter().chain(second).enumerate() {
            matched = pattern.step(matched, byte);
            if matched == m {
                return Some(start + offset + 1 - m);
            }
        }
        None
    }

    /// Offset of the first byte at or after `start` matching `predicate`.
    /// One pass over the content, wraparound included.
    pub fn position<P>(&self, start: usize, mut predicate: P) -> Option<usize>
    where
        P: FnMut(u8) -> bool,
    {
        if start >= self.size {
            return None;
        }
        let (a, b) = self.as_slices();
        let (first, second) = if start < a.len() {
            (&a[start..], b)
        } else {
            (&[][..], &b[start - a.len()..])
        };
        first
            .iter()
            .chain(second)
            .position(|&byte| predicate(byte))
            .map(|offset| start + offset)
    }

    /// All (possibly overlapping) occurrences of `pattern`
    pub fn find_all(&self, pattern: &[u8]) -> Vec<usize> {
        let mut positions = Vec::new();
        if pattern.is_empty() {
            return positions;
        }
        let compiled = Pattern::new(pattern);
        let mut pos = 0;
        while let Some(found) = self.find_compiled(&compiled, pos) {
            positions.push(found);
            pos = found + 1;
        }
        positions
    }

    /// Length of the contiguous run starting at the head
    pub fn max_contiguous_read(&self) -> usize {
        self.size.min(self.capacity() - self.head)
    }

    /// Length of the contiguous free run starting at the tail
    pub fn max_contiguous_write(&self) -> usize {
        self.free_space().min(self.capacity() - self.tail)
    }

    /// Zero-copy view of the oldest contiguous bytes. Consume them with
    /// [`commit_read`](Self::commit_read) once the view is dropped.
    pub fn read_view(&self) -> &[u8] {
        self.as_slices().0
    }

    /// Zero-copy view of the contiguous free space at the tail. Bytes
    /// written into it become content after [`commit_write`](Self::commit_write).
    pub fn write_view(&mut self) -> &mut [u8] {
        let len = self.max_contiguous_write();
        let tail = self.tail;
        &mut self.storage[tail..tail + len]
    }

    /// Mark `count` bytes obtained through [`read_view`](Self::read_view) as consumed
    pub fn commit_read(&mut self, count: usize) -> Result<(), BufferError> {
        let available = self.max_contiguous_read();
        if count > available {
            return Err(BufferError::InvalidCommit {
                requested: count,
                available,
            });
        }
        self.advance(count);
        Ok(())
    }

    /// Mark `count` bytes written through [`write_view`](Self::write_view) as content
    pub fn commit_write(&mut self, count: usize) -> Result<(), BufferError> {
        let available = self.max_contiguous_write();
        if count > available {
            return Err(BufferError::InvalidCommit {
                requested: count,
                available,
            });
        }
        self.tail = self.wrap(self.tail + count);
        self.size += count;
        self.total_written += count as u64;
        Ok(())
    }

    /// Get occupancy statistics
    pub fn stats(&self) -> BufferStats {
        let capacity = self.capacity();
        BufferStats {
            size: self.size,
            capacity,
            free_space: self.free_space(),
            head: self.head,
            tail: self.tail,
            utilization_percent: if capacity == 0 {
                0.0
            } else {
                self.size as f64 / capacity as f64 * 100.0
            },
            wrapped: self.head + self.size > capacity,
        }
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("size", &self.size)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("policy", &self.policy)
            .finish()
    }
}
