pub(crate) mod connection;

pub(crate) mod frame;

mod info;
pub use info::parse_info;

use std::fmt;

// Line delimiter of every RESP frame.
pub(crate) const DELIMITER: &[u8; 2] = b"\r\n";

/// Reply represents a single value sent back by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Error reply(`-ERR ...`). The command failed but the connection is still usable.
    Error(String),
    Integer(i64),
    /// Simple string reply(`+OK`).
    Status(String),
    /// Bulk string reply. Binary safe.
    Bulk(Vec<u8>),
    /// Null bulk string or null array.
    Nil,
    Array(Vec<Reply>),
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Return the textual content of string like replies.
    pub fn as_text(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Reply::Status(s) => Some(s.as_str().into()),
            Reply::Bulk(bytes) => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }

    // Name of the reply shape used in diagnostics.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Reply::Error(_) => "error",
            Reply::Integer(_) => "integer",
            Reply::Status(_) => "status",
            Reply::Bulk(_) => "bulk",
            Reply::Nil => "nil",
            Reply::Array(_) => "array",
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reply::Error(message) | Reply::Status(message) => write!(f, "{}", message),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Bulk(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Reply::Nil => write!(f, "nil"),
            Reply::Array(items) => write!(f, "({} {})", self.kind(), items.len()),
        }
    }
}
