//! Local child-process backend over [`tokio::process`].

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::info;

use super::{ProcessBackend, ProcessHandle, SpawnedProcess};
use crate::{Result, SessionError};

/// Backend that spawns the interpreter as a local child process.
///
/// All three stdio handles are piped; the child carries
/// `kill_on_drop(true)` so an abandoned session cannot leak a process. The
/// parent environment is inherited: the interpreter is the caller's own
/// shell and is expected to see it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl ProcessBackend for LocalBackend {
    fn start<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<SpawnedProcess>> + Send + 'a>> {
        Box::pin(async move {
            let mut child = Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|err| SessionError::Spawn(format!("failed to spawn {program}: {err}")))?;

            let stdin = child
                .stdin
                .take()
                .ok_or_else(|| SessionError::Spawn("failed to capture interpreter stdin".into()))?;
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| SessionError::Spawn("failed to capture interpreter stdout".into()))?;
            let stderr = child
                .stderr
                .take()
                .ok_or_else(|| SessionError::Spawn("failed to capture interpreter stderr".into()))?;

            info!(program, pid = child.id().unwrap_or(0), "interpreter process spawned");

            Ok(SpawnedProcess {
                handle: Box::new(LocalHandle { child }),
                stdin: Box::new(stdin),
                stdout: Box::new(stdout),
                stderr: Box::new(stderr),
            })
        })
    }
}

/// [`ProcessHandle`] over a local [`Child`].
struct LocalHandle {
    child: Child,
}

impl ProcessHandle for LocalHandle {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<i32>>> + Send + '_>> {
        Box::pin(async move {
            let status = self
                .child
                .wait()
                .await
                .map_err(|err| SessionError::Io(format!("failed to wait for interpreter: {err}")))?;
            Ok(status.code())
        })
    }
}
