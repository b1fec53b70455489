use std::fmt;

use crate::error::ProtocolError;

/// The command word of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Put,
    Get,
    List,
}

impl Verb {
    /// The verb as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Put => "put",
            Verb::Get => "get",
            Verb::List => "list",
        }
    }

    /// Whether the verb carries a filename.
    pub fn takes_filename(self) -> bool {
        matches!(self, Verb::Put | Verb::Get)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verb {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "put" => Ok(Verb::Put),
            "get" => Ok(Verb::Get),
            "list" => Ok(Verb::List),
            other => Err(ProtocolError::UnknownVerb(other.to_string())),
        }
    }
}

/// A parsed request line. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    verb: Verb,
    filename: Option<String>,
}

impl TransferRequest {
    /// Upload request for `filename`.
    pub fn put(filename: impl Into<String>) -> Self {
        Self {
            verb: Verb::Put,
            filename: Some(filename.into()),
        }
    }

    /// Download request for `filename`.
    pub fn get(filename: impl Into<String>) -> Self {
        Self {
            verb: Verb::Get,
            filename: Some(filename.into()),
        }
    }

    /// Directory listing request.
    pub fn list() -> Self {
        Self {
            verb: Verb::List,
            filename: None,
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Parses the first buffer received on a connection.
    ///
    /// Surrounding whitespace is ignored. The verb is the first
    /// whitespace-delimited word; everything after it (trimmed) is the
    /// filename. `put` and `get` without a filename are rejected. A filename
    /// after `list` is accepted and ignored.
    pub fn parse(buf: &[u8]) -> Result<Self, ProtocolError> {
        let line = std::str::from_utf8(buf).map_err(|_| ProtocolError::InvalidEncoding)?;
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::EmptyRequest);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let verb: Verb = word.parse()?;

        if verb == Verb::List {
            return Ok(Self::list());
        }
        if rest.is_empty() {
            return Err(ProtocolError::MissingFilename(verb));
        }
        Ok(Self {
            verb,
            filename: Some(rest.to_string()),
        })
    }

    /// Encodes the request line as sent by the client (no terminator).
    pub fn to_line(&self) -> String {
        match &self.filename {
            Some(name) if self.verb.takes_filename() => format!("{} {name}", self.verb),
            _ => self.verb.to_string(),
        }
    }
}
