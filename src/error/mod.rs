pub(crate) mod internal;

use std::error;
use std::fmt;
use std::io;

use rustyline::error::ReadlineError;

#[derive(Debug)]
pub enum RespError {
    // Invalid flags, environment, config file or certificate material.
    Config(String),
    // Dial or tls handshake failure.
    Connection(String),
    // The server refused the credentials.
    Unauthenticated(String),
    // The server answered a single-shot command with an error reply, already rendered on stdout.
    ErrorReply(String),
    // The server sent a reply of an unexpected shape.
    UnexpectedReply { command: String, reply: String },
    Terminal(String),
    Io(io::Error),
    Internal(internal::Error),
}

impl fmt::Display for RespError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RespError::Config(description) => write!(f, "configuration error. {}", description),
            RespError::Connection(description) => write!(f, "connection error. {}", description),
            RespError::Unauthenticated(message) => write!(f, "unauthenticated. {}", message),
            RespError::ErrorReply(message) => write!(f, "{}", message),
            RespError::UnexpectedReply { command, reply } => {
                write!(f, "unexpected reply to {}: {}", command, reply)
            }
            RespError::Terminal(description) => write!(f, "terminal error. {}", description),
            RespError::Io(err) => err.fmt(f),
            RespError::Internal(err) => err.fmt(f),
        }
    }
}

impl error::Error for RespError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            RespError::Io(err) => Some(err),
            RespError::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RespError {
    fn from(err: io::Error) -> Self {
        RespError::Io(err)
    }
}

impl From<internal::Error> for RespError {
    fn from(err: internal::Error) -> Self {
        RespError::Internal(err)
    }
}

impl From<internal::ErrorKind> for RespError {
    fn from(kind: internal::ErrorKind) -> Self {
        RespError::Internal(internal::Error::from(kind))
    }
}

impl From<serde_yaml::Error> for RespError {
    fn from(err: serde_yaml::Error) -> Self {
        RespError::Config(format!("config file: {}", err))
    }
}

impl From<ReadlineError> for RespError {
    fn from(err: ReadlineError) -> Self {
        match err {
            ReadlineError::Io(err) => RespError::Io(err),
            err => RespError::Terminal(err.to_string()),
        }
    }
}

impl RespError {
    pub fn is_connection_closed(&self) -> bool {
        match self {
            RespError::Internal(err) => err.is_disconnected(),
            RespError::Io(err) => internal::is_disconnected(err),
            _ => false,
        }
    }
}
