//! Chunked file streaming and directory-listing transfer.
//!
//! Every connection read and write that moves payload bytes goes through a
//! [`RetryPolicy`]. Exhausting the policy aborts the whole transfer: a byte
//! stream has no way to resynchronise after a lost chunk.

mod chunked;
mod listing;
mod retry;
mod sizing;
mod stream;
mod summary;

#[cfg(test)]
mod test_support;

pub use chunked::ChunkReader;
pub use listing::{LISTING_SLICE_SIZE, listing_payload, recv_listing, send_listing};
pub use retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy, RetryState};
pub use sizing::chunk_size;
pub use stream::{Framing, TransferOptions, recv_stream, recv_stream_to_path, send_stream};
pub use summary::TransferSummary;

/// Smallest chunk the sender uses (files under 1 MiB).
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Largest chunk the sender uses (files of 100 MiB and more).
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;

/// Receive buffer size. The receiver never knows the file size up front.
pub const RECV_BUFFER_SIZE: usize = MAX_CHUNK_SIZE;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Local filesystem or unretried connection failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("connection closed before {0}")]
    UnexpectedEof(&'static str),
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
