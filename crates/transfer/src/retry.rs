use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, warn};

use crate::TransferError;

/// Attempts per chunk operation unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts unless configured otherwise.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Bounded-attempt, fixed-delay retry around a single connection read or write.
///
/// Only errors returned by the connection itself are retried. Filesystem
/// errors never pass through a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never below 1.
    pub max_attempts: u32,
    /// Sleep between a failed attempt and the next one.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A policy that retries without sleeping.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Starts tracking attempts for one operation.
    pub fn begin(&self, operation: &'static str) -> RetryState {
        RetryState {
            operation,
            attempt: 0,
            max_attempts: self.max_attempts.max(1),
            delay: self.delay,
        }
    }

    /// Writes all of `buf`, retrying the whole write on error.
    pub async fn write_all<W>(
        &self,
        writer: &mut W,
        buf: &[u8],
        operation: &'static str,
    ) -> Result<(), TransferError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut state = self.begin(operation);
        loop {
            match writer.write_all(buf).await {
                Ok(()) => return Ok(()),
                Err(e) => state.failed(e).await?,
            }
        }
    }

    /// Performs one read into `buf`, retrying on error. `Ok(0)` means EOF.
    pub async fn read<R>(
        &self,
        reader: &mut R,
        buf: &mut [u8],
        operation: &'static str,
    ) -> Result<usize, TransferError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut state = self.begin(operation);
        loop {
            match reader.read(buf).await {
                Ok(n) => return Ok(n),
                Err(e) => state.failed(e).await?,
            }
        }
    }
}

/// Attempt bookkeeping for one chunk operation. Discarded after success or
/// exhaustion.
#[derive(Debug)]
pub struct RetryState {
    operation: &'static str,
    attempt: u32,
    max_attempts: u32,
    delay: Duration,
}

impl RetryState {
    /// Failed attempts recorded so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Records a failed attempt.
    ///
    /// Sleeps and returns `Ok(())` when another attempt is allowed, otherwise
    /// returns [`TransferError::RetriesExhausted`] carrying the last error.
    pub async fn failed(&mut self, err: io::Error) -> Result<(), TransferError> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            error!(
                operation = self.operation,
                attempts = self.attempt,
                "giving up: {err}"
            );
            return Err(TransferError::RetriesExhausted {
                operation: self.operation,
                attempts: self.attempt,
                source: err,
            });
        }

        warn!(
            operation = self.operation,
            "{err}, retrying ({}/{})", self.attempt, self.max_attempts
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FlakyReader, FlakyWriter};

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn new_clamps_to_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn state_allows_retries_until_max() {
        let mut state = RetryPolicy::immediate(3).begin("test");
        assert!(state.failed(io::ErrorKind::BrokenPipe.into()).await.is_ok());
        assert!(state.failed(io::ErrorKind::BrokenPipe.into()).await.is_ok());
        let err = state
            .failed(io::ErrorKind::BrokenPipe.into())
            .await
            .unwrap_err();
        assert_eq!(state.attempt(), 3);
        assert!(matches!(
            err,
            TransferError::RetriesExhausted { attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn write_recovers_after_transient_failures() {
        let mut writer = FlakyWriter::failing(2);
        RetryPolicy::immediate(3)
            .write_all(&mut writer, b"payload", "send chunk")
            .await
            .unwrap();
        assert_eq!(writer.attempts(), 3);
        assert_eq!(writer.written(), b"payload");
    }

    #[tokio::test]
    async fn write_gives_up_after_max_attempts() {
        let mut writer = FlakyWriter::failing(4);
        let err = RetryPolicy::immediate(3)
            .write_all(&mut writer, b"payload", "send chunk")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::RetriesExhausted {
                operation: "send chunk",
                attempts: 3,
                ..
            }
        ));
        assert_eq!(writer.attempts(), 3);
        assert!(writer.written().is_empty());
    }

    #[tokio::test]
    async fn read_recovers_after_transient_failure() {
        let mut reader = FlakyReader::new(1, b"hello");
        let mut buf = [0u8; 16];
        let n = RetryPolicy::immediate(3)
            .read(&mut reader, &mut buf, "receive chunk")
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[tokio::test]
    async fn read_gives_up_after_max_attempts() {
        let mut reader = FlakyReader::new(3, b"hello");
        let mut buf = [0u8; 16];
        let err = RetryPolicy::immediate(3)
            .read(&mut reader, &mut buf, "receive chunk")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::RetriesExhausted {
                operation: "receive chunk",
                attempts: 3,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied_between_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        let mut writer = FlakyWriter::failing(1);
        let started = tokio::time::Instant::now();
        policy
            .write_all(&mut writer, b"x", "send chunk")
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
    }
}
