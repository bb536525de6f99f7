use std::error;
use std::fmt;
use std::io;

use backtrace::Backtrace;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

#[derive(Debug)]
pub enum ErrorKind {
    Io(io::Error),
    NetworkFraming(String),
    ConnectionResetByPeer,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::Io(err) => err.fmt(f),
            ErrorKind::NetworkFraming(description) => {
                write!(f, "protocol error. {}", description)
            }
            ErrorKind::ConnectionResetByPeer => write!(f, "connection reset by peer"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from(ErrorKind::Io(err))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_backtrace(kind)
    }
}

impl Error {
    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    // Whether the peer went away.
    pub(crate) fn is_disconnected(&self) -> bool {
        match self.kind() {
            ErrorKind::Io(err) => is_disconnected(err),
            ErrorKind::ConnectionResetByPeer => true,
            _ => false,
        }
    }

    fn with_backtrace(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Some(Backtrace::new()),
        }
    }
}

pub(crate) fn is_disconnected(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}
