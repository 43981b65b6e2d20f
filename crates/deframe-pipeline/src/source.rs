//! Byte sources feeding the pipeline

use crate::error::PipelineError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::debug;

/// Default read size for [`feed`]
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Read `input` until EOF, forwarding each read as one chunk.
///
/// Returns the number of bytes forwarded. Stops early without error if the
/// pipeline has gone away.
pub async fn feed<R>(
    mut input: R,
    chunks: mpsc::Sender<Vec<u8>>,
    chunk_size: usize,
) -> Result<u64, PipelineError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = input.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
        if chunks.send(buf[..n].to_vec()).await.is_err() {
            debug!("Pipeline closed after {} bytes", total);
            break;
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_splits_into_chunks() {
        let (tx, mut rx) = mpsc::channel(16);
        let input: &[u8] = b"0123456789";

        let total = feed(input, tx, 4).await.unwrap();
        assert_eq!(total, 10);

        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            chunks.push(chunk);
        }
        assert_eq!(chunks.concat(), b"0123456789");
        assert!(chunks.iter().all(|c| c.len() <= 4));
    }

    #[tokio::test]
    async fn test_feed_stops_when_pipeline_closes() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let input: &[u8] = b"abc";
        assert_eq!(feed(input, tx, 2).await.unwrap(), 2);
    }
}
