//! Persistent interpreter sessions.
//!
//! A [`Session`] owns one interpreter process and its three pipes, and
//! turns the interpreter's unstructured stdio into per-command results:
//! each [`Session::execute`] call frames the command with two fresh
//! boundary tokens, writes it to the interpreter's stdin, and concurrently
//! captures both output pipes up to their boundary lines. The process
//! stays alive between commands, so interpreter state (variables, working
//! directory) carries over.

use std::mem;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::local::LocalBackend;
use crate::backend::{InputPipe, OutputPipe, ProcessBackend, ProcessHandle};
use crate::config::SessionConfig;
use crate::fence::boundary::Boundary;
use crate::fence::reader::capture_stream;
use crate::{Result, SessionError};

/// Output of one executed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output, newline-joined, boundary line stripped.
    pub stdout: String,
    /// Captured standard error, newline-joined, boundary line stripped.
    pub stderr: String,
}

/// Lifecycle state guarded by the session mutex.
enum SessionState {
    /// Process and pipes are live.
    Running(Box<RunningSession>),
    /// [`Session::exit`] has run; all resources are dropped.
    Closed,
}

/// Everything a live session owns.
struct RunningSession {
    handle: Box<dyn ProcessHandle>,
    stdin: InputPipe,
    stdout: OutputPipe,
    stderr: OutputPipe,
    /// Raw bytes of the last captured stdout, for diagnostics.
    last_stdout: Vec<u8>,
    /// Raw bytes of the last captured stderr, for diagnostics.
    last_stderr: Vec<u8>,
}

/// A persistent, interactive session with one interpreter process.
///
/// Commands are strictly serialized: the internal mutex is held for the
/// whole of [`Session::execute`] and [`Session::exit`], so concurrent
/// calls on a shared session queue up instead of interleaving their
/// boundary scans.
pub struct Session {
    id: String,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session with the local child-process backend.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the profile is invalid and
    /// [`SessionError::Spawn`] if the interpreter cannot be launched.
    pub async fn start(config: SessionConfig) -> Result<Self> {
        Self::start_with_backend(&LocalBackend, config).await
    }

    /// Start a session on a caller-provided process backend.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the profile is invalid, or the
    /// backend's error if the interpreter cannot be launched.
    pub async fn start_with_backend(
        backend: &dyn ProcessBackend,
        config: SessionConfig,
    ) -> Result<Self> {
        config.profile.validate()?;

        let spawned = backend
            .start(&config.profile.program, &config.profile.args)
            .await?;

        let session = Self {
            id: Uuid::new_v4().to_string(),
            config,
            state: Mutex::new(SessionState::Running(Box::new(RunningSession {
                handle: spawned.handle,
                stdin: spawned.stdin,
                stdout: spawned.stdout,
                stderr: spawned.stderr,
                last_stdout: Vec::new(),
                last_stderr: Vec::new(),
            }))),
        };

        info!(
            session_id = %session.id,
            program = %session.config.profile.program,
            "interpreter session started"
        );
        Ok(session)
    }

    /// This session's identifier, as used in its log events.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the session has not yet been exited.
    pub async fn is_running(&self) -> bool {
        matches!(&*self.state.lock().await, SessionState::Running(_))
    }

    /// Execute one command and capture its delimited output.
    ///
    /// The command may span multiple lines or contain the interpreter's
    /// own statement separators; it is submitted as-is, followed by one
    /// echo statement per stream that prints that stream's boundary token.
    /// Both pipes are captured concurrently until their boundary lines
    /// arrive, and the interpreter state advances exactly as if the framed
    /// text had been typed interactively.
    ///
    /// The framing is line-oriented: a command whose stdout ends without a
    /// trailing newline merges the boundary echo into its last line, so
    /// the capture never sees the boundary. Configure a command deadline
    /// when commands may do that. On deadline expiry the session stays
    /// running, but output from the abandoned command may surface in front
    /// of the next command's capture.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Closed`] — the session has been exited; the
    ///   rejected command is carried in the error.
    /// - [`SessionError::CommandWrite`] — the interpreter's stdin rejected
    ///   the framed command.
    /// - [`SessionError::StreamRead`] — a pipe read failed mid-capture;
    ///   the truncated capture is discarded.
    /// - [`SessionError::Timeout`] — the deadline expired before both
    ///   boundary lines arrived.
    pub async fn execute(&self, command: &str) -> Result<CommandOutput> {
        let mut state = self.state.lock().await;
        let SessionState::Running(run) = &mut *state else {
            return Err(SessionError::Closed(format!("cannot execute {command:?}")));
        };

        let stdout_boundary = Boundary::generate();
        let stderr_boundary = Boundary::generate();
        let full = self
            .config
            .profile
            .frame_command(command, &stdout_boundary, &stderr_boundary);

        debug!(session_id = %self.id, bytes = full.len(), "submitting framed command");

        run.stdin.write_all(full.as_bytes()).await.map_err(|err| {
            SessionError::CommandWrite(format!("could not send {command:?}: {err}"))
        })?;
        run.stdin.flush().await.map_err(|err| {
            SessionError::CommandWrite(format!("could not flush {command:?}: {err}"))
        })?;

        let captures = async {
            tokio::join!(
                capture_stream(&mut run.stdout, &stdout_boundary),
                capture_stream(&mut run.stderr, &stderr_boundary),
            )
        };
        let (stdout_capture, stderr_capture) = match self.config.command_timeout() {
            Some(deadline) => {
                tokio::time::timeout(deadline, captures)
                    .await
                    .map_err(|_| {
                        warn!(session_id = %self.id, ?deadline, "command deadline expired");
                        SessionError::Timeout(format!(
                            "no boundary within {deadline:?} for {command:?}"
                        ))
                    })?
            }
            None => captures.await,
        };
        let stdout_capture = stdout_capture?;
        let stderr_capture = stderr_capture?;

        run.last_stdout = stdout_capture.raw;
        run.last_stderr = stderr_capture.raw;

        debug!(
            session_id = %self.id,
            stdout_bytes = run.last_stdout.len(),
            stderr_bytes = run.last_stderr.len(),
            "command capture complete"
        );

        Ok(CommandOutput {
            stdout: stdout_capture.text,
            stderr: stderr_capture.text,
        })
    }

    /// Ask the interpreter to quit and wait for the process to exit.
    ///
    /// Writes the profile's exit statement, closes the stdin pipe so the
    /// interpreter also sees end-of-input, and waits for the process. The
    /// session transitions to closed before any of that can fail, so it
    /// never ends up half-torn-down.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Closed`] — the session was already exited.
    /// - [`SessionError::Io`] — waiting on the process failed.
    pub async fn exit(&self) -> Result<Option<i32>> {
        let mut state = self.state.lock().await;
        let SessionState::Running(run) = mem::replace(&mut *state, SessionState::Closed) else {
            return Err(SessionError::Closed("cannot exit twice".into()));
        };
        let mut run = *run;

        let exit_line = self.config.profile.exit_line();
        if let Err(err) = run.stdin.write_all(exit_line.as_bytes()).await {
            // The interpreter may already be gone; the EOF below still
            // unblocks it otherwise.
            warn!(session_id = %self.id, %err, "failed to write exit statement");
        }
        if let Err(err) = run.stdin.shutdown().await {
            warn!(session_id = %self.id, %err, "failed to close interpreter stdin");
        }
        drop(run.stdin);

        let code = run.handle.wait().await?;
        info!(session_id = %self.id, exit_code = ?code, "interpreter session exited");
        Ok(code)
    }

    /// Raw bytes of the last captured stdout, kept for diagnostics only.
    /// Empty before the first command and after the session closes.
    pub async fn last_stdout_bytes(&self) -> Vec<u8> {
        match &*self.state.lock().await {
            SessionState::Running(run) => run.last_stdout.clone(),
            SessionState::Closed => Vec::new(),
        }
    }

    /// Raw bytes of the last captured stderr, kept for diagnostics only.
    /// Empty before the first command and after the session closes.
    pub async fn last_stderr_bytes(&self) -> Vec<u8> {
        match &*self.state.lock().await {
            SessionState::Running(run) => run.last_stderr.clone(),
            SessionState::Closed => Vec::new(),
        }
    }
}
