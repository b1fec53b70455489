//! Literal byte sequences shared by both peers.

/// Appended by the sender directly after the last data chunk.
///
/// Not escaped: file content containing this sequence ends the stream early.
pub const END_OF_STREAM_MARKER: &[u8] = b"END_OF_FILE";

/// Opens a directory listing frame.
pub const LIST_BEGIN_MARKER: &str = "!!!!!!!!!!!!!!!LIST_BEGIN!!!!!!!!!!!!!!!";

/// Closes a directory listing frame.
pub const LIST_END_MARKER: &str = "!!!!!!!!!!!!!!!!LIST_END!!!!!!!!!!!!!!!!";

/// Largest request line the server reads in its single request read.
pub const MAX_REQUEST_LEN: usize = 1024;

/// Sent by the server once an uploaded file has been written.
pub const PUT_ACK: &str = "File saved successfully on the server.";

/// Handshake acceptance.
pub const REPLY_OK: &str = "OK";

/// Prefix shared by every handshake rejection.
pub const REPLY_ERROR_PREFIX: &str = "Error";
