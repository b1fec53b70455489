//! File client.
//!
//! Each command opens its own connection, performs one request, and closes
//! the connection when the command returns.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use filedock_protocol::{Reply, TransferRequest};
use filedock_transfer::{
    TransferOptions, TransferSummary, recv_listing, recv_stream_to_path, send_stream,
};

use crate::TCP_CONNECT_TIMEOUT;
use crate::error::SessionError;
use crate::wire::{read_ack, read_reply, write_request};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub transfer: TransferOptions,
    pub connect_timeout: Duration,
    /// Directory `get` writes downloads into.
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transfer: TransferOptions::default(),
            connect_timeout: TCP_CONNECT_TIMEOUT,
            download_dir: PathBuf::from("."),
        }
    }
}

/// Result of a successful `put`.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name the file was stored under on the server.
    pub name: String,
    pub summary: TransferSummary,
    /// Acknowledgement text, if the server sent one before closing.
    pub ack: Option<String>,
}

/// Result of a successful `get`.
#[derive(Debug, Clone)]
pub struct Download {
    /// Base name requested from the server.
    pub name: String,
    /// Local path the file was written to.
    pub path: PathBuf,
    pub summary: TransferSummary,
}

/// Client for a filedock server.
pub struct FileClient {
    host: String,
    port: u16,
    config: ClientConfig,
}

impl FileClient {
    pub fn new(host: impl Into<String>, port: u16, config: ClientConfig) -> Self {
        Self {
            host: host.into(),
            port,
            config,
        }
    }

    /// Uploads the file at `path` under its base name.
    ///
    /// The local file is checked before connecting; a missing file is
    /// reported without contacting the server.
    pub async fn put(&self, path: &Path) -> Result<Upload, SessionError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(SessionError::LocalFileMissing(path.to_path_buf())),
        }
        let name = base_name(path)?;

        let mut conn = self.connect().await?;
        write_request(&mut conn, &TransferRequest::put(&name)).await?;
        expect_ok(read_reply(&mut conn).await?)?;

        let summary = send_stream(&mut conn, path, &self.config.transfer).await?;
        // Half-close so the server sees the end of the upload even if it
        // misses the marker.
        conn.shutdown().await?;

        let ack = read_ack(&mut conn).await?;
        match &ack {
            Some(text) => debug!(ack = %text, "server acknowledged upload"),
            None => warn!(name, "server closed without acknowledging upload"),
        }
        info!(
            name,
            bytes = summary.bytes,
            bytes_per_sec = summary.bytes_per_second() as u64,
            "upload complete"
        );
        Ok(Upload { name, summary, ack })
    }

    /// Downloads `name` into the configured download directory.
    ///
    /// Only the base name is sent to the server and used locally. An
    /// existing local file of that name is overwritten.
    pub async fn get(&self, name: &str) -> Result<Download, SessionError> {
        let name = base_name(Path::new(name))?;
        let dest = self.config.download_dir.join(&name);

        let mut conn = self.connect().await?;
        write_request(&mut conn, &TransferRequest::get(&name)).await?;
        expect_ok(read_reply(&mut conn).await?)?;

        let summary = recv_stream_to_path(&mut conn, &dest, &self.config.transfer).await?;
        info!(
            name,
            path = %dest.display(),
            bytes = summary.bytes,
            bytes_per_sec = summary.bytes_per_second() as u64,
            "download complete"
        );
        Ok(Download {
            name,
            path: dest,
            summary,
        })
    }

    /// Lists the names stored on the server.
    pub async fn list(&self) -> Result<Vec<String>, SessionError> {
        let mut conn = self.connect().await?;
        write_request(&mut conn, &TransferRequest::list()).await?;
        let names = recv_listing(&mut conn, &self.config.transfer.retry).await?;
        debug!(entries = names.len(), "listing received");
        Ok(names)
    }

    async fn connect(&self) -> Result<TcpStream, SessionError> {
        let addr = (self.host.as_str(), self.port);
        match tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                debug!(host = %self.host, port = self.port, "connected");
                Ok(stream)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(SessionError::Timeout),
        }
    }
}

fn expect_ok(reply: Reply) -> Result<(), SessionError> {
    match reply {
        Reply::Ok => Ok(()),
        Reply::Error(text) => Err(SessionError::Rejected(text)),
    }
}

fn base_name(path: &Path) -> Result<String, SessionError> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| SessionError::InvalidPath(path.display().to_string()))
}
