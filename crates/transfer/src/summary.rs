use std::time::Duration;

/// Outcome of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    /// Payload bytes moved, markers and length prefixes excluded.
    pub bytes: u64,
    /// Connection writes (send side) or reads (receive side) that carried payload.
    pub chunks: u64,
    pub elapsed: Duration,
}

impl TransferSummary {
    pub fn new(bytes: u64, chunks: u64, elapsed: Duration) -> Self {
        Self {
            bytes,
            chunks,
            elapsed,
        }
    }

    /// Average throughput. Returns 0.0 for instantaneous transfers.
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs
    }
}
