//! Error types for command sessions.

use std::path::PathBuf;

use filedock_protocol::ProtocolError;
use filedock_transfer::TransferError;

/// Errors produced by a client or server session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server answered the handshake with an `Error...` reply.
    #[error("{0}")]
    Rejected(String),

    #[error("Error: File '{}' does not exist.", .0.display())]
    LocalFileMissing(PathBuf),

    #[error("invalid file path: {0}")]
    InvalidPath(String),

    #[error("connection timed out")]
    Timeout,
}
