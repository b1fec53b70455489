use crate::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};

const MIB: u64 = 1024 * 1024;

/// Maps a file size to the sender's chunk size.
///
/// | file size          | chunk  |
/// |--------------------|--------|
/// | < 1 MiB            | 1 KiB  |
/// | [1 MiB, 10 MiB)    | 8 KiB  |
/// | [10 MiB, 100 MiB)  | 32 KiB |
/// | >= 100 MiB         | 64 KiB |
pub fn chunk_size(file_size: u64) -> usize {
    if file_size < MIB {
        MIN_CHUNK_SIZE
    } else if file_size < 10 * MIB {
        8 * 1024
    } else if file_size < 100 * MIB {
        32 * 1024
    } else {
        MAX_CHUNK_SIZE
    }
}
