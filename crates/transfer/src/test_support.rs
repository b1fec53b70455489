//! Connection doubles that fail a fixed number of times before behaving.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Writer whose first `failures` writes return `ConnectionReset`.
pub(crate) struct FlakyWriter {
    failures: usize,
    attempts: usize,
    written: Vec<u8>,
}

impl FlakyWriter {
    pub(crate) fn failing(failures: usize) -> Self {
        Self {
            failures,
            attempts: 0,
            written: Vec::new(),
        }
    }

    /// Number of write calls seen, failed or not.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts
    }

    pub(crate) fn written(&self) -> &[u8] {
        &self.written
    }
}

impl AsyncWrite for FlakyWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.attempts += 1;
        if self.failures > 0 {
            self.failures -= 1;
            return Poll::Ready(Err(io::ErrorKind::ConnectionReset.into()));
        }
        self.written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Reader that returns `ConnectionReset` `failures` times once `fail_at`
/// bytes of `data` have been served, then serves the rest and reports EOF.
pub(crate) struct FlakyReader {
    failures: usize,
    fail_at: usize,
    data: Vec<u8>,
    pos: usize,
}

impl FlakyReader {
    /// Fails before the first byte.
    pub(crate) fn new(failures: usize, data: &[u8]) -> Self {
        Self::failing_after(0, failures, data)
    }

    /// Serves `fail_at` bytes, then fails `failures` times.
    pub(crate) fn failing_after(fail_at: usize, failures: usize, data: &[u8]) -> Self {
        Self {
            failures,
            fail_at,
            data: data.to_vec(),
            pos: 0,
        }
    }
}

impl AsyncRead for FlakyReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.failures > 0 && self.pos >= self.fail_at {
            self.failures -= 1;
            return Poll::Ready(Err(io::ErrorKind::ConnectionReset.into()));
        }
        let end = if self.failures > 0 {
            self.fail_at.min(self.data.len())
        } else {
            self.data.len()
        };
        let n = (end - self.pos).min(buf.remaining());
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}
