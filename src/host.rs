//! Stream Host
//!
//! Feeds GPGL from stdin, a file, or TCP connections through the decoder
//! and writes every batch to stdout. Each read chunk is one batch, traced
//! from the origin; each stream owns its own [`StreamDecoder`].
//!
//! Path and JSON output are written per batch as soon as a chunk is traced.
//! SVG output is one document per stream (stdin, the file, or each TCP
//! connection), written when that stream ends.

use std::fmt;
use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinSet;

use crate::config::{Config, InputSource, OutputFormat};
use crate::diagnostics::Diagnostic;
use crate::parser::StreamDecoder;
use crate::path::{self, PathPrimitive, SvgOptions};

/// Formatted batches queued for stdout before readers wait
pub const OUTPUT_QUEUE_DEPTH: usize = 64;

/// Everything produced from one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub commands: usize,
    /// Records the decoder could not turn into commands
    pub skipped_records: usize,
    pub primitives: Vec<PathPrimitive>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Totals for one finished stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSummary {
    pub chunks: usize,
    pub commands: usize,
    pub skipped_records: usize,
    pub unterminated_bytes: usize,
}

impl StreamSummary {
    fn record(&mut self, batch: &Batch) {
        self.chunks += 1;
        self.commands += batch.commands;
        self.skipped_records += batch.skipped_records;
    }
}

impl fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks, {} commands, {} skipped records",
            self.chunks, self.commands, self.skipped_records
        )
    }
}

/// Decode one chunk and trace it as an independent batch
pub fn process_chunk(decoder: &mut StreamDecoder, chunk: &str) -> Batch {
    let decoded = decoder.feed(chunk);
    let (primitives, geometry) = path::trace_with_diagnostics(&decoded.commands);

    let skipped_records = decoded.diagnostics.len();
    let mut diagnostics = decoded.diagnostics;
    diagnostics.extend(geometry);

    Batch {
        commands: decoded.commands.len(),
        skipped_records,
        primitives,
        diagnostics,
    }
}

/// Format one batch for path or JSON output; empty batches produce nothing
pub fn render_batch(
    primitives: &[PathPrimitive],
    format: OutputFormat,
    svg: &SvgOptions,
) -> Result<Option<String>> {
    if primitives.is_empty() {
        return Ok(None);
    }

    let text = match format {
        OutputFormat::Path => format!("{}\n", path::to_path_data(primitives)),
        OutputFormat::Json => {
            let json = serde_json::to_string(primitives).context("Failed to encode batch")?;
            format!("{}\n", json)
        }
        OutputFormat::Svg => path::to_document(primitives, svg),
    };

    Ok(Some(text))
}

/// Run the configured input source to completion
pub async fn run(config: Config) -> Result<()> {
    let (tx, rx) = mpsc::channel(OUTPUT_QUEUE_DEPTH);
    let writer = tokio::spawn(write_output(rx, tokio::io::stdout()));

    let result = match config.source.clone() {
        InputSource::Stdin => decode_stream(tokio::io::stdin(), "stdin", &config, &tx)
            .await
            .map(|summary| log::info!("stdin: {}", summary)),
        InputSource::File(file_path) => {
            let name = file_path.display().to_string();
            match File::open(&file_path).await {
                Ok(file) => decode_stream(file, &name, &config, &tx)
                    .await
                    .map(|summary| log::info!("{}: {}", name, summary)),
                Err(e) => Err(anyhow!(e).context(format!("Failed to open {}", name))),
            }
        }
        InputSource::Tcp(addr) => serve(&addr, &config, &tx).await,
    };

    // Close the channel so the writer drains and exits.
    drop(tx);
    writer.await.context("Output writer task failed")??;

    result
}

/// Accept raw GPGL connections until interrupted.
///
/// Interrupting drops the accept loop, which aborts every open connection.
pub async fn serve(addr: &str, config: &Config, tx: &Sender<String>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Accepting raw GPGL on {}", listener.local_addr()?);

    tokio::select! {
        result = accept_connections(listener, config.clone(), tx.clone()) => result,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

/// Spawn one decoding task per accepted connection.
///
/// Connection tasks live in a [`JoinSet`]; dropping this future aborts them
/// and releases their output senders.
pub async fn accept_connections(
    listener: TcpListener,
    config: Config,
    tx: Sender<String>,
) -> Result<()> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted.context("Failed to accept connection")?;
                let name = format_connection_name(Some(peer));
                log::info!("GPGL connection from {} established", name);

                let config = config.clone();
                let tx = tx.clone();
                connections.spawn(async move {
                    match decode_stream(stream, &name, &config, &tx).await {
                        Ok(summary) => log::info!("GPGL connection {} closed: {}", name, summary),
                        Err(e) => log::warn!("GPGL connection {} dropped: {:#}", name, e),
                    }
                });
            }
            Some(finished) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = finished {
                    log::warn!("GPGL connection task failed: {}", e);
                }
            }
        }
    }
}

/// Decode a byte stream chunk by chunk
pub async fn decode_stream<R>(
    mut reader: R,
    name: &str,
    config: &Config,
    tx: &Sender<String>,
) -> Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = StreamDecoder::new();
    let mut buffer = vec![0u8; config.chunk_size];
    let mut summary = StreamSummary::default();
    let mut document = Vec::new();
    let collect = config.format == OutputFormat::Svg;

    loop {
        let read = reader
            .read(&mut buffer)
            .await
            .with_context(|| format!("Failed to read from {}", name))?;
        if read == 0 {
            break;
        }
        log::debug!("Decoding {}b of GPGL from {}", read, name);

        // GPGL is ASCII; anything else is replaced rather than rejected.
        let chunk = String::from_utf8_lossy(&buffer[..read]);
        let batch = process_chunk(&mut decoder, &chunk);
        summary.record(&batch);

        if collect {
            document.push(batch.primitives);
        } else if let Some(text) = render_batch(&batch.primitives, config.format, &config.svg)? {
            send(tx, text).await?;
        }
    }

    let leftover = decoder.finish();
    if !leftover.is_empty() {
        summary.unterminated_bytes = leftover.len();
        log::warn!(
            "{} ended with an unterminated {}b record; it was not drawn",
            name,
            leftover.len()
        );
    }

    if collect {
        let svg = path::to_combined_document(document.iter().map(Vec::as_slice), &config.svg);
        send(tx, svg).await?;
    }

    Ok(summary)
}

/// Drain formatted batches to the output in arrival order
pub async fn write_output<W>(mut rx: Receiver<String>, mut out: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = rx.recv().await {
        out.write_all(text.as_bytes())
            .await
            .context("Failed to write output")?;
    }
    out.flush().await.context("Failed to flush output")?;
    Ok(())
}

/// Connection name for logs; `None` when the peer address is unknown
pub fn format_connection_name(address: Option<SocketAddr>) -> String {
    match address {
        Some(addr) => addr.to_string(),
        None => "<unknown address>".to_string(),
    }
}

async fn send(tx: &Sender<String>, text: String) -> Result<()> {
    tx.send(text)
        .await
        .map_err(|_| anyhow!("Output writer has stopped"))
}
