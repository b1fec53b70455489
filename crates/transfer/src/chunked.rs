use std::io;
use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::TransferError;
use crate::sizing::chunk_size;

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a file in pieces sized by [`chunk_size`].
///
/// Every chunk but the last is exactly `chunk_size` bytes. The reader stops
/// at the size observed when the file was opened.
pub struct ChunkReader {
    file: File,
    buf: Vec<u8>,
    offset: u64,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` and sizes the chunk buffer from its length.
    pub async fn open(path: &Path) -> Result<Self, TransferError> {
        let file = File::open(path).await?;
        let file_size = file.metadata().await?.len();
        Ok(Self {
            file,
            buf: vec![0u8; chunk_size(file_size)],
            offset: 0,
            file_size,
        })
    }

    /// Reads the next chunk. Returns `None` once `file_size` bytes were read.
    pub async fn next_chunk(&mut self) -> Result<Option<&[u8]>, TransferError> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(None);
        }

        let want = usize::try_from(remaining).map_or(self.buf.len(), |r| r.min(self.buf.len()));
        let mut filled = 0;
        while filled < want {
            let n = self.file.read(&mut self.buf[filled..want]).await?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "file shrank while being read",
                )
                .into());
            }
            filled += n;
        }

        self.offset += filled as u64;
        Ok(Some(&self.buf[..filled]))
    }

    /// Chunk size chosen for this file.
    pub fn chunk_size(&self) -> usize {
        self.buf.len()
    }

    /// Bytes handed out so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// File size at open time.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn remaining(&self) -> u64 {
        self.file_size - self.offset
    }
}
