//! File streaming over an established connection.
//!
//! # Framing
//!
//! ```text
//! Sentinel:        [file bytes]["END_OF_FILE"]
//! LengthPrefixed:  [8 bytes BE: file_size][file bytes]
//! ```
//!
//! Sentinel framing is what the reference peer speaks. The receiver looks for
//! the marker inside each read buffer only, so a marker split across two reads
//! is written out as data and the receiver keeps waiting. Content containing
//! the marker ends the stream early.

use std::io;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use filedock_protocol::END_OF_STREAM_MARKER;

use crate::chunked::ChunkReader;
use crate::retry::RetryPolicy;
use crate::summary::TransferSummary;
use crate::{RECV_BUFFER_SIZE, TransferError, find_subslice};

/// How the end of a file stream is signalled. Both peers must agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// Data followed by [`END_OF_STREAM_MARKER`].
    #[default]
    Sentinel,
    /// 8-byte big-endian length, then exactly that many bytes.
    LengthPrefixed,
}

/// Per-transfer settings shared by both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferOptions {
    pub retry: RetryPolicy,
    pub framing: Framing,
}

/// Streams the file at `path` to `conn`.
///
/// Each chunk is written under the retry policy; the end marker (or length
/// prefix) is written once, unretried. When a chunk exhausts its retries the
/// transfer stops there and nothing else is sent.
pub async fn send_stream<W>(
    conn: &mut W,
    path: &Path,
    opts: &TransferOptions,
) -> Result<TransferSummary, TransferError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let started = Instant::now();
    let mut reader = ChunkReader::open(path).await?;
    let chunk_size = reader.chunk_size();

    if opts.framing == Framing::LengthPrefixed {
        conn.write_u64(reader.file_size()).await?;
    }

    let mut chunks = 0u64;
    while let Some(chunk) = reader.next_chunk().await? {
        opts.retry.write_all(conn, chunk, "send chunk").await?;
        chunks += 1;
    }

    if opts.framing == Framing::Sentinel {
        conn.write_all(END_OF_STREAM_MARKER).await?;
    }
    conn.flush().await?;

    let summary = TransferSummary::new(reader.offset(), chunks, started.elapsed());
    debug!(
        path = %path.display(),
        bytes = summary.bytes,
        chunks,
        chunk_size,
        "file stream sent"
    );
    Ok(summary)
}

/// Receives a file stream from `conn` into `out`.
///
/// On error `out` keeps whatever was already written; nothing is cleaned up.
pub async fn recv_stream<R, W>(
    conn: &mut R,
    out: &mut W,
    opts: &TransferOptions,
) -> Result<TransferSummary, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let started = Instant::now();
    let (bytes, chunks) = match opts.framing {
        Framing::Sentinel => recv_until_marker(conn, out, &opts.retry).await?,
        Framing::LengthPrefixed => recv_exact_length(conn, out, &opts.retry).await?,
    };
    out.flush().await?;

    let summary = TransferSummary::new(bytes, chunks, started.elapsed());
    debug!(bytes, chunks, "file stream received");
    Ok(summary)
}

/// Creates (or truncates) `path` and receives a file stream into it.
pub async fn recv_stream_to_path<R>(
    conn: &mut R,
    path: &Path,
    opts: &TransferOptions,
) -> Result<TransferSummary, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = tokio::fs::File::create(path).await?;
    recv_stream(conn, &mut file, opts).await
}

async fn recv_until_marker<R, W>(
    conn: &mut R,
    out: &mut W,
    retry: &RetryPolicy,
) -> Result<(u64, u64), TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    let mut bytes = 0u64;
    let mut chunks = 0u64;

    loop {
        let n = retry.read(conn, &mut buf, "receive chunk").await?;
        if n == 0 {
            return Err(TransferError::UnexpectedEof("end-of-stream marker"));
        }
        chunks += 1;

        let data = &buf[..n];
        if find_subslice(data, END_OF_STREAM_MARKER).is_some() {
            let kept = strip_marker(data);
            out.write_all(&kept).await?;
            bytes += kept.len() as u64;
            return Ok((bytes, chunks));
        }

        out.write_all(data).await?;
        bytes += n as u64;
    }
}

async fn recv_exact_length<R, W>(
    conn: &mut R,
    out: &mut W,
    retry: &RetryPolicy,
) -> Result<(u64, u64), TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let total = conn.read_u64().await.map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TransferError::UnexpectedEof("length prefix"),
        _ => TransferError::Io(e),
    })?;

    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    let mut remaining = total;
    let mut chunks = 0u64;

    while remaining > 0 {
        let to_read = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let n = retry
            .read(conn, &mut buf[..to_read], "receive chunk")
            .await?;
        if n == 0 {
            return Err(TransferError::UnexpectedEof("end of file data"));
        }
        out.write_all(&buf[..n]).await?;
        remaining -= n as u64;
        chunks += 1;
    }

    Ok((total, chunks))
}

/// Copy of `data` with every occurrence of the marker removed.
fn strip_marker(data: &[u8]) -> Vec<u8> {
    let mut kept = Vec::with_capacity(data.len());
    let mut rest = data;
    while let Some(pos) = find_subslice(rest, END_OF_STREAM_MARKER) {
        kept.extend_from_slice(&rest[..pos]);
        rest = &rest[pos + END_OF_STREAM_MARKER.len()..];
    }
    kept.extend_from_slice(rest);
    kept
}
