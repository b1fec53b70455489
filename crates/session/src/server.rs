//! File server.
//!
//! Accepts TCP connections and runs one session per connection on its own
//! task. Each session reads a single request, answers it against the
//! [`Storage`] root, and closes the connection.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use filedock_protocol::{ProtocolError, Reply, Verb};
use filedock_transfer::{TransferOptions, TransferSummary, recv_stream, send_listing, send_stream};

use crate::DEFAULT_STORAGE_DIR;
use crate::error::SessionError;
use crate::storage::Storage;
use crate::wire::{read_request, write_ack, write_reply};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (port 0 = OS-assigned).
    pub bind_addr: SocketAddr,
    pub storage_dir: PathBuf,
    pub transfer: TransferOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 0).into(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            transfer: TransferOptions::default(),
        }
    }
}

/// How a session ended, when it ended without a connection error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Stored {
        name: String,
        summary: TransferSummary,
    },
    Served {
        name: String,
        summary: TransferSummary,
    },
    Listed {
        entries: usize,
    },
    /// The handshake was answered with this `Error...` reply.
    Rejected(String),
    /// The request could not be parsed; nothing was sent back.
    BadRequest(ProtocolError),
}

/// The put/get/list file server.
pub struct FileServer {
    bind_addr: SocketAddr,
    storage: Storage,
    transfer: TransferOptions,
    cancel: CancellationToken,
}

impl FileServer {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            bind_addr: config.bind_addr,
            storage: Storage::new(config.storage_dir),
            transfer: config.transfer,
            cancel: CancellationToken::new(),
        })
    }

    /// Creates the storage directory and binds the listener.
    pub async fn bind(&self) -> Result<TcpListener, SessionError> {
        self.storage.ensure().await?;
        let listener = TcpListener::bind(self.bind_addr).await?;
        info!(
            addr = %listener.local_addr()?,
            storage = %self.storage.root().display(),
            "file server listening"
        );
        Ok(listener)
    }

    /// Gracefully stops the accept loop. [`run`](Self::run) returns once the
    /// sessions already running have finished.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Accepts connections until [`shutdown`](Self::shutdown) is called, then
    /// waits for every spawned session to finish.
    pub async fn run(self: &Arc<Self>, listener: TcpListener) -> Result<(), SessionError> {
        let sessions = TaskTracker::new();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("file server shutting down");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            debug!(%peer_addr, "connection accepted");
                            let server = Arc::clone(self);
                            sessions.spawn(async move {
                                match server.handle_connection(stream).await {
                                    Ok(outcome) => log_outcome(peer_addr, &outcome),
                                    Err(e) => error!(%peer_addr, "session failed: {e}"),
                                }
                            });
                        }
                        Err(e) => {
                            error!("accept error: {e}");
                        }
                    }
                }
            }
        }

        drop(listener);
        sessions.close();
        if !sessions.is_empty() {
            info!(sessions = sessions.len(), "waiting for running sessions");
        }
        sessions.wait().await;
        Ok(())
    }

    /// Runs one session over `conn`.
    ///
    /// The connection is consumed and closed when this returns, on every
    /// path.
    pub async fn handle_connection<S>(&self, mut conn: S) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let request = match read_request(&mut conn).await {
            Ok(request) => request,
            Err(SessionError::Protocol(e)) => {
                if e == ProtocolError::EmptyRequest {
                    info!("empty request, closing connection");
                } else {
                    warn!("bad request, closing connection: {e}");
                }
                return Ok(SessionOutcome::BadRequest(e));
            }
            Err(e) => return Err(e),
        };

        match (request.verb(), request.filename()) {
            (Verb::Put, Some(name)) => self.serve_put(&mut conn, name).await,
            (Verb::Get, Some(name)) => self.serve_get(&mut conn, name).await,
            (Verb::List, _) => self.serve_list(&mut conn).await,
            (verb, None) => Ok(SessionOutcome::BadRequest(ProtocolError::MissingFilename(
                verb,
            ))),
        }
    }

    async fn serve_put<S>(&self, conn: &mut S, name: &str) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut file = match self.storage.create_exclusive(name).await {
            Ok(file) => file,
            Err(e) => {
                let reply = if e.kind() == io::ErrorKind::AlreadyExists {
                    Reply::file_exists()
                } else {
                    warn!(name, "could not create upload: {e}");
                    Reply::error("Could not create file")
                };
                return reject(conn, reply).await;
            }
        };

        write_reply(conn, &Reply::Ok).await?;
        let summary = recv_stream(conn, &mut file, &self.transfer).await?;

        if let Err(e) = write_ack(conn).await {
            warn!(name, "could not acknowledge upload: {e}");
        }
        Ok(SessionOutcome::Stored {
            name: name.to_string(),
            summary,
        })
    }

    async fn serve_get<S>(&self, conn: &mut S, name: &str) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let Some(path) = self.storage.find_file(name).await else {
            return reject(conn, Reply::file_not_found()).await;
        };

        write_reply(conn, &Reply::Ok).await?;
        let summary = send_stream(conn, &path, &self.transfer).await?;
        Ok(SessionOutcome::Served {
            name: name.to_string(),
            summary,
        })
    }

    async fn serve_list<S>(&self, conn: &mut S) -> Result<SessionOutcome, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let names = self.storage.list().await?;
        send_listing(conn, &names, &self.transfer.retry).await?;
        Ok(SessionOutcome::Listed {
            entries: names.len(),
        })
    }
}

async fn reject<S>(conn: &mut S, reply: Reply) -> Result<SessionOutcome, SessionError>
where
    S: AsyncWrite + Unpin,
{
    write_reply(conn, &reply).await?;
    Ok(SessionOutcome::Rejected(reply.as_str().to_string()))
}

fn log_outcome(peer_addr: SocketAddr, outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Stored { name, summary } => info!(
            %peer_addr,
            name,
            bytes = summary.bytes,
            bytes_per_sec = summary.bytes_per_second() as u64,
            "file stored"
        ),
        SessionOutcome::Served { name, summary } => info!(
            %peer_addr,
            name,
            bytes = summary.bytes,
            bytes_per_sec = summary.bytes_per_second() as u64,
            "file served"
        ),
        SessionOutcome::Listed { entries } => info!(%peer_addr, entries, "listing sent"),
        SessionOutcome::Rejected(reply) => info!(%peer_addr, reply, "request rejected"),
        SessionOutcome::BadRequest(e) => debug!(%peer_addr, "bad request: {e}"),
    }
}
