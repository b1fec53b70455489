//! Directory listing frames.
//!
//! ```text
//! LIST_BEGIN "\n" name ("\n" name)* "\n" LIST_END
//! ```
//!
//! Sent as a flat byte sequence in fixed-size slices that ignore name
//! boundaries. Names containing newlines are not escaped.

use std::time::Instant;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use filedock_protocol::{LIST_BEGIN_MARKER, LIST_END_MARKER};

use crate::retry::RetryPolicy;
use crate::summary::TransferSummary;
use crate::{TransferError, find_subslice};

/// Slice size for both sending and receiving a listing.
pub const LISTING_SLICE_SIZE: usize = 500;

/// Builds the listing frame for `names`, in the given order.
pub fn listing_payload<S: AsRef<str>>(names: &[S]) -> String {
    let body = names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    format!("{LIST_BEGIN_MARKER}\n{body}\n{LIST_END_MARKER}")
}

/// Sends the listing frame for `names` in [`LISTING_SLICE_SIZE`] slices.
///
/// No acknowledgement is expected from the peer.
pub async fn send_listing<W, S>(
    conn: &mut W,
    names: &[S],
    retry: &RetryPolicy,
) -> Result<TransferSummary, TransferError>
where
    W: AsyncWrite + Unpin + ?Sized,
    S: AsRef<str>,
{
    let started = Instant::now();
    let payload = listing_payload(names);
    let mut chunks = 0u64;

    for slice in payload.as_bytes().chunks(LISTING_SLICE_SIZE) {
        retry.write_all(conn, slice, "send listing slice").await?;
        chunks += 1;
    }
    conn.flush().await?;

    debug!(entries = names.len(), bytes = payload.len(), "listing sent");
    Ok(TransferSummary::new(
        payload.len() as u64,
        chunks,
        started.elapsed(),
    ))
}

/// Receives a listing frame and returns the names between the markers.
///
/// Bytes are accumulated until the end marker shows up anywhere in the
/// accumulated buffer. If the connection fails or closes first, everything
/// accumulated is discarded and the error is returned.
pub async fn recv_listing<R>(
    conn: &mut R,
    retry: &RetryPolicy,
) -> Result<Vec<String>, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let end = LIST_END_MARKER.as_bytes();
    let mut acc = Vec::new();
    let mut slice = [0u8; LISTING_SLICE_SIZE];

    loop {
        let n = retry.read(conn, &mut slice, "receive listing slice").await?;
        if n == 0 {
            return Err(TransferError::UnexpectedEof("end of listing"));
        }

        // The marker can only end inside the new bytes.
        let search_from = acc.len().saturating_sub(end.len() - 1);
        acc.extend_from_slice(&slice[..n]);
        if let Some(pos) = find_subslice(&acc[search_from..], end) {
            acc.truncate(search_from + pos);
            break;
        }
    }

    let text = String::from_utf8_lossy(&acc);
    let body = text.replace(LIST_BEGIN_MARKER, "");
    let names: Vec<String> = body
        .trim_matches('\n')
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    debug!(entries = names.len(), "listing received");
    Ok(names)
}
