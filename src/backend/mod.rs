//! Process backends — how interpreter processes are started and owned.
//!
//! A session consumes its backend through this narrow seam: given a program
//! and arguments, the backend produces a wait-able process handle plus the
//! three stdio endpoints. The local child-process backend lives in
//! [`local`]; test suites substitute in-memory fakes.

pub mod local;

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::Result;

/// Write end of the interpreter's stdin pipe.
pub type InputPipe = Box<dyn AsyncWrite + Send + Unpin>;

/// Read end of one interpreter output pipe (stdout or stderr).
pub type OutputPipe = Box<dyn AsyncRead + Send + Unpin>;

/// Handle to a started interpreter process.
pub trait ProcessHandle: Send {
    /// Wait for the process to terminate and return its exit code, when
    /// one is available (a signal-killed process has none).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`](crate::SessionError::Io) if waiting on
    /// the process fails.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + '_>>;
}

/// A started interpreter process and its three stdio endpoints.
///
/// All four parts stay valid until the session exits; they are either all
/// owned by a live session or all dropped together.
pub struct SpawnedProcess {
    /// Wait-able process handle.
    pub handle: Box<dyn ProcessHandle>,
    /// The interpreter's stdin (write end).
    pub stdin: InputPipe,
    /// The interpreter's stdout (read end).
    pub stdout: OutputPipe,
    /// The interpreter's stderr (read end).
    pub stderr: OutputPipe,
}

/// Launches interpreter processes for sessions.
pub trait ProcessBackend {
    /// Start `program` with `args`, returning the handle and pipes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Spawn`](crate::SessionError::Spawn) if the
    /// process cannot be launched or a stdio handle cannot be captured.
    fn start<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<SpawnedProcess>> + Send + 'a>>;
}
