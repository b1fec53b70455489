//! Handshake encoding over a live connection.
//!
//! # Wire format
//!
//! ```text
//! REQUEST (client -> server):   "<verb> <filename>" | "list"     one read, <= 1024 bytes
//! REPLY (server -> client):     "OK" | "Error: <reason>"         put/get only, server
//!                                                                 closes after an error
//! PUT ACK (server -> client):   "File saved successfully on the server."
//! ```
//!
//! Nothing is newline-terminated. The request is whatever the server's first
//! read returns, so two requests pipelined on one connection are undefined.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use filedock_protocol::constants::REPLY_OK;
use filedock_protocol::{MAX_REQUEST_LEN, PUT_ACK, Reply, TransferRequest};

use crate::error::SessionError;

/// Longest reply text the client accepts after the first two bytes.
const MAX_REPLY_TAIL: u64 = (MAX_REQUEST_LEN - REPLY_OK.len()) as u64;

/// Reads and parses the request with a single read of up to
/// [`MAX_REQUEST_LEN`] bytes.
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<TransferRequest, SessionError> {
    let mut buf = [0u8; MAX_REQUEST_LEN];
    let n = reader.read(&mut buf).await?;
    Ok(TransferRequest::parse(&buf[..n])?)
}

/// Writes the request line.
pub async fn write_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    request: &TransferRequest,
) -> Result<(), SessionError> {
    writer.write_all(request.to_line().as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Writes a handshake reply.
pub async fn write_reply<W: AsyncWrite + Unpin>(
    writer: &mut W,
    reply: &Reply,
) -> Result<(), SessionError> {
    writer.write_all(reply.as_str().as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads a handshake reply.
///
/// Exactly two bytes are read first so that an `OK` never swallows the start
/// of the data phase. Anything else is an error reply, which the server
/// follows by closing, so the rest is read to EOF.
pub async fn read_reply<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Reply, SessionError> {
    let mut head = [0u8; 2];
    reader.read_exact(&mut head).await?;
    if head == *REPLY_OK.as_bytes() {
        return Ok(Reply::Ok);
    }

    let mut text = head.to_vec();
    reader.take(MAX_REPLY_TAIL).read_to_end(&mut text).await?;
    Ok(Reply::parse(&text)?)
}

/// Writes the upload acknowledgement.
pub async fn write_ack<W: AsyncWrite + Unpin>(writer: &mut W) -> Result<(), SessionError> {
    writer.write_all(PUT_ACK.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads whatever acknowledgement the server sent before closing.
///
/// Returns `None` if the server closed without one.
pub async fn read_ack<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<String>, SessionError> {
    let mut buf = Vec::new();
    reader
        .take(MAX_REQUEST_LEN as u64)
        .read_to_end(&mut buf)
        .await?;
    if buf.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
