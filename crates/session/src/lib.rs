//! Command sessions for the filedock service.
//!
//! A session is one TCP connection carrying one request. The server reads
//! the request line, answers `put`/`get` with an `OK`/`Error` handshake, and
//! hands the connection to a stream or listing transfer. The connection is
//! closed when the session value is dropped, whatever the outcome.
//!
//! # Wire format
//!
//! See [`wire`] and [`filedock_protocol`].

pub mod client;
pub mod error;
pub mod server;
pub mod storage;
pub mod wire;

pub use client::{ClientConfig, Download, FileClient, Upload};
pub use error::SessionError;
pub use server::{FileServer, ServerConfig, SessionOutcome};
pub use storage::Storage;

use std::time::Duration;

/// Storage root used when none is configured.
pub const DEFAULT_STORAGE_DIR: &str = "uploaded_files";

/// Timeout for the client's TCP connection attempt.
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
