//! Error types for the wire protocol.

/// Malformed requests and replies.
///
/// The server answers none of the request variants; it logs and closes the
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty request")]
    EmptyRequest,

    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    #[error("unsupported verb: {0}")]
    UnknownVerb(String),

    #[error("{0} requires a filename")]
    MissingFilename(crate::Verb),

    #[error("unexpected handshake reply: {0:?}")]
    UnexpectedReply(String),
}
