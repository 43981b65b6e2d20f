//! deframe - split a byte stream into frames
//!
//! Usage: `deframe [INPUT]`. Reads INPUT (or stdin when absent or `-`) and
//! prints one JSON record per frame. Settings come from the TOML file named
//! by `DEFRAME_CONFIG` plus `DEFRAME__*` overrides.

use anyhow::Context;
use deframe_pipeline::{feed, init_logging, FramePipeline, FrameRecord, PipelineSettings};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("DEFRAME_CONFIG").map(PathBuf::from);
    let settings = PipelineSettings::load(config_path.as_deref())
        .context("Failed to load settings")?;
    init_logging(&settings.log_level)?;

    info!("=== deframe v{} ===", env!("CARGO_PKG_VERSION"));

    let input = std::env::args().nth(1).filter(|arg| arg != "-");
    let pipeline = FramePipeline::new(&settings);
    let (chunks, mut frames, handle) = pipeline.spawn(settings.channel_capacity);

    let producer = tokio::spawn(async move {
        match input {
            Some(path) => {
                info!("Reading {}", path);
                let file = tokio::fs::File::open(&path).await?;
                feed(file, chunks, deframe_pipeline::DEFAULT_CHUNK_SIZE).await
            }
            None => feed(tokio::io::stdin(), chunks, deframe_pipeline::DEFAULT_CHUNK_SIZE).await,
        }
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    while let Some(frame) = frames.recv().await {
        serde_json::to_writer(&mut out, &FrameRecord::from(&frame))?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    drop(out);

    let bytes_read = producer.await?.context("Failed to read input")?;
    let report = handle.await?;
    info!("Read {} bytes", bytes_read);
    info!("{}", serde_json::to_string(&report)?);

    Ok(())
}
