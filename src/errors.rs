//! Error types shared across the crate.

use std::fmt::{Display, Formatter};

/// Shared crate result type.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Session error enumeration covering all failure modes of the
/// command/response protocol.
#[derive(Debug)]
pub enum SessionError {
    /// Operation attempted on a session that has already been exited.
    Closed(String),
    /// The process backend could not launch the interpreter.
    Spawn(String),
    /// Writing a framed command to the interpreter's stdin failed.
    CommandWrite(String),
    /// A stream capture's read from stdout or stderr failed.
    StreamRead(String),
    /// A command did not complete within the configured deadline.
    Timeout(String),
    /// Configuration parsing or validation failure.
    Config(String),
    /// Pipe read or other I/O operation failure.
    Io(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed(msg) => write!(f, "closed session: {msg}"),
            Self::Spawn(msg) => write!(f, "spawn: {msg}"),
            Self::CommandWrite(msg) => write!(f, "command write: {msg}"),
            Self::StreamRead(msg) => write!(f, "stream read: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

// The codec's `Decoder` impl needs its error type to absorb raw I/O errors
// from the underlying pipe.
impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
