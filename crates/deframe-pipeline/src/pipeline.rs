//! Single-consumer deframing pipeline
//!
//! One task owns the ring buffer and the frame reader. Producers hand over
//! byte chunks through a bounded channel, so the core never sees concurrent
//! access.

use crate::settings::PipelineSettings;
use frame_reader::{FrameReader, RawFrame, ReaderStats};
use metrics::counter;
use ring_buffer::{OverflowPolicy, RingBuffer};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counters reported when the pipeline stops
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Frame reader counters
    pub reader: ReaderStats,
    /// Bytes received from producers
    pub bytes_received: u64,
    /// Bytes discarded to recover from a full buffer
    pub bytes_dropped: u64,
    /// Bytes still buffered (an unterminated frame)
    pub bytes_pending: usize,
}

/// Ring buffer plus frame reader, driven one chunk at a time
pub struct FramePipeline {
    buffer: RingBuffer,
    reader: FrameReader,
    bytes_received: u64,
    bytes_dropped: u64,
    /// Checksum failures already exported as metrics
    reported_failures: u64,
}

impl FramePipeline {
    /// Build a pipeline from settings
    pub fn new(settings: &PipelineSettings) -> Self {
        info!(
            "Creating frame pipeline: {} byte buffer ({:?} on overflow)",
            settings.buffer.capacity, settings.buffer.overflow
        );
        Self {
            buffer: RingBuffer::with_policy(settings.buffer.capacity, settings.buffer.overflow),
            reader: FrameReader::new(settings.reader.clone()),
            bytes_received: 0,
            bytes_dropped: 0,
            reported_failures: 0,
        }
    }

    /// Append one transport chunk and return every frame it completes.
    ///
    /// Under the `Reject` policy the chunk is fed in pieces no larger than
    /// the free space, extracting after each piece, so a terminator early in
    /// the chunk completes the buffered frame before the rest arrives. Only
    /// a full buffer from which nothing could be extracted is discarded to
    /// resynchronise.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawFrame> {
        self.bytes_received += chunk.len() as u64;
        let mut frames = Vec::new();
        let mut rest = chunk;

        while !rest.is_empty() {
            let take = match self.buffer.policy() {
                OverflowPolicy::Reject => rest.len().min(self.buffer.free_space()),
                OverflowPolicy::Grow | OverflowPolicy::OverwriteOldest => rest.len(),
            };

            if take == 0 {
                if self.buffer.is_empty() {
                    warn!("Zero-capacity buffer, dropping {} bytes", rest.len());
                    self.record_drop(rest.len());
                    break;
                }
                // Full, and the last extraction freed nothing
                warn!(
                    "Buffer full without a complete frame; discarding {} buffered bytes",
                    self.buffer.len()
                );
                self.record_drop(self.buffer.len());
                self.buffer.clear();
                continue;
            }

            let (piece, tail) = rest.split_at(take);
            if let Err(e) = self.buffer.append(piece) {
                warn!("Chunk dropped: {}", e);
                self.record_drop(rest.len());
                break;
            }
            frames.extend(self.reader.extract_frames(&mut self.buffer));
            rest = tail;
        }

        self.export_metrics(frames.len());
        frames
    }

    fn record_drop(&mut self, count: usize) {
        self.bytes_dropped += count as u64;
        counter!("deframe_dropped_bytes_total").increment(count as u64);
    }

    fn export_metrics(&mut self, emitted: usize) {
        if emitted > 0 {
            counter!("deframe_frames_total").increment(emitted as u64);
        }
        let failures = self.reader.stats().checksum_failures;
        if failures > self.reported_failures {
            counter!("deframe_checksum_failures_total").increment(failures - self.reported_failures);
            self.reported_failures = failures;
        }
    }

    /// The frame reader
    pub fn reader(&self) -> &FrameReader {
        &self.reader
    }

    /// The ring buffer
    pub fn buffer(&self) -> &RingBuffer {
        &self.buffer
    }

    /// Current counters
    pub fn report(&self) -> PipelineReport {
        PipelineReport {
            reader: self.reader.stats(),
            bytes_received: self.bytes_received,
            bytes_dropped: self.bytes_dropped,
            bytes_pending: self.buffer.len(),
        }
    }

    /// Consume chunks until every producer is gone or the frame consumer
    /// hangs up
    pub async fn run(
        mut self,
        mut chunks: mpsc::Receiver<Vec<u8>>,
        frames: mpsc::Sender<RawFrame>,
    ) -> PipelineReport {
        info!("Starting frame pipeline");

        while let Some(chunk) = chunks.recv().await {
            for frame in self.push(&chunk) {
                if frames.send(frame).await.is_err() {
                    debug!("Frame receiver dropped, stopping pipeline");
                    return self.report();
                }
            }
        }

        let report = self.report();
        info!(
            "Frame pipeline stopped: {} frames, {} checksum failures, {} bytes pending",
            report.reader.frames_emitted, report.reader.checksum_failures, report.bytes_pending
        );
        report
    }

    /// Spawn [`run`](Self::run) on the tokio runtime. Returns the chunk
    /// sender, the frame receiver and the task handle.
    pub fn spawn(
        self,
        channel_capacity: usize,
    ) -> (
        mpsc::Sender<Vec<u8>>,
        mpsc::Receiver<RawFrame>,
        JoinHandle<PipelineReport>,
    ) {
        let capacity = channel_capacity.max(1);
        let (chunk_tx, chunk_rx) = mpsc::channel(capacity);
        let (frame_tx, frame_rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(self.run(chunk_rx, frame_tx));
        (chunk_tx, frame_rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BufferSettings;
    use frame_reader::{FrameDetectionMode, FrameReaderConfig, OperationMode};

    fn settings(capacity: usize, overflow: OverflowPolicy) -> PipelineSettings {
        PipelineSettings {
            buffer: BufferSettings { capacity, overflow },
            ..Default::default()
        }
    }

    #[test]
    fn test_push_extracts_frames() {
        let mut pipeline = FramePipeline::new(&settings(32, OverflowPolicy::Reject));
        assert!(pipeline.push(b"12,3").is_empty());
        let frames = pipeline.push(b"4\n56");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"12,34");
        assert_eq!(pipeline.report().bytes_pending, 2);
    }

    #[test]
    fn test_chunk_filling_buffer_exactly() {
        let mut pipeline = FramePipeline::new(&settings(8, OverflowPolicy::Reject));
        assert_eq!(pipeline.push(b"abc\ndefg").len(), 1);
        let frames = pipeline.push(b"\nxyz");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"defg");
        assert_eq!(pipeline.report().bytes_dropped, 0);
    }

    #[test]
    fn test_unterminated_garbage_is_discarded() {
        let mut pipeline = FramePipeline::new(&settings(8, OverflowPolicy::Reject));
        pipeline.push(b"garbage!");
        let frames = pipeline.push(b"ok\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"ok");
        assert_eq!(pipeline.report().bytes_dropped, 8);
    }

    #[test]
    fn test_terminator_at_start_of_overflowing_chunk() {
        let mut pipeline = FramePipeline::new(&settings(8, OverflowPolicy::Reject));
        assert!(pipeline.push(b"abc").is_empty());
        let frames = pipeline.push(b"\nxxxxxxx");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), b"abc");
        assert_eq!(pipeline.report().bytes_dropped, 0);
        assert_eq!(pipeline.buffer().to_vec(), b"xxxxxxx");
    }

    #[test]
    fn test_oversized_chunk_is_framed_in_pieces() {
        let mut pipeline = FramePipeline::new(&settings(4, OverflowPolicy::Reject));
        let frames = pipeline.push(b"ab\ncd\nef\n");
        let lines: Vec<&str> = frames.iter().filter_map(|f| f.as_str()).collect();
        assert_eq!(lines, vec!["ab", "cd", "ef"]);
        assert_eq!(pipeline.report().bytes_dropped, 0);
        assert_eq!(pipeline.reader().stats().frames_emitted, 3);
        assert_eq!(pipeline.reader().config().operation_mode, OperationMode::QuickPlot);
    }

    #[test]
    fn test_zero_capacity_drops_everything() {
        let mut pipeline = FramePipeline::new(&settings(0, OverflowPolicy::Reject));
        assert!(pipeline.push(b"a\n").is_empty());
        assert_eq!(pipeline.report().bytes_dropped, 2);
    }

    #[test]
    fn test_grow_policy_never_drops() {
        let mut pipeline = FramePipeline::new(&settings(4, OverflowPolicy::Grow));
        pipeline.push(b"a long line that does not fit");
        let frames = pipeline.push(b"\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(pipeline.report().bytes_dropped, 0);
        assert!(pipeline.buffer().capacity() >= 29);
    }

    #[tokio::test]
    async fn test_spawned_pipeline_delivers_frames_in_order() {
        let mut settings = settings(64, OverflowPolicy::Reject);
        settings.reader = FrameReaderConfig::project_file(FrameDetectionMode::EndDelimiterOnly)
            .with_finish(b"\n")
            .with_checksum("xor");
        let pipeline = FramePipeline::new(&settings);
        let (tx, mut rx, handle) = pipeline.spawn(4);

        let producer = tokio::spawn(async move {
            for i in 0..10u8 {
                let payload = format!("frame-{}", i).into_bytes();
                let mut chunk = payload.clone();
                chunk.push(b'\n');
                chunk.extend(checksum::compute("xor", &payload, None));
                tx.send(chunk).await.unwrap();
            }
        });

        let mut received = Vec::new();
        while let Some(frame) = rx.recv().await {
            received.push(frame);
        }
        producer.await.unwrap();
        let report = handle.await.unwrap();

        assert_eq!(received.len(), 10);
        assert_eq!(received[9].as_str(), Some("frame-9"));
        assert!(received.windows(2).all(|w| w[0].sequence() < w[1].sequence()));
        assert_eq!(report.reader.frames_emitted, 10);
        assert_eq!(report.bytes_pending, 0);
    }
}
