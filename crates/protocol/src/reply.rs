use crate::constants::{REPLY_ERROR_PREFIX, REPLY_OK};
use crate::error::ProtocolError;

/// Handshake reply sent by the server before a `put` or `get` data phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    /// Full wire text, including the `Error` prefix.
    Error(String),
}

impl Reply {
    /// Builds an `Error: <reason>` reply.
    pub fn error(reason: impl AsRef<str>) -> Self {
        Reply::Error(format!("{REPLY_ERROR_PREFIX}: {}", reason.as_ref()))
    }

    pub fn file_exists() -> Self {
        Reply::error("File already exists")
    }

    pub fn file_not_found() -> Self {
        Reply::error("File not found")
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok)
    }

    /// Wire text of the reply.
    pub fn as_str(&self) -> &str {
        match self {
            Reply::Ok => REPLY_OK,
            Reply::Error(text) => text,
        }
    }

    /// Parses a complete reply buffer.
    pub fn parse(buf: &[u8]) -> Result<Self, ProtocolError> {
        let text = String::from_utf8_lossy(buf);
        if text == REPLY_OK {
            Ok(Reply::Ok)
        } else if text.starts_with(REPLY_ERROR_PREFIX) {
            Ok(Reply::Error(text.into_owned()))
        } else {
            Err(ProtocolError::UnexpectedReply(text.into_owned()))
        }
    }
}
