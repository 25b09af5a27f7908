//! Process execution seam for the monk bridge.
//!
//! The production runner uses tokio with a bounded wait and kills the child
//! when the timeout fires. Test doubles can return canned output without
//! spawning processes.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; -1 when the process was terminated by a signal.
    pub exit_code: i32,
    /// Standard output decoded as (lossy) UTF-8.
    pub stdout: String,
    /// Standard error decoded as (lossy) UTF-8.
    pub stderr: String,
}

impl ProcessOutput {
    /// Convenience constructor used by runners and tests.
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Reasons a process produced no exit status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("executable not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Io(String),
}

/// Runs an external program with a bounded wait.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args`, waiting at most `timeout`.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, RunError>;
}

/// Production runner backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(program: &str, err: io::Error) -> RunError {
    match err.kind() {
        io::ErrorKind::NotFound => RunError::NotFound(program.to_string()),
        _ => RunError::Io(format!("failed to spawn {program}: {err}")),
    }
}

/// Reads a child pipe to the end. A missing pipe reads as empty.
async fn drain_pipe<R>(pipe: Option<&mut R>, program: &str, name: &str) -> Result<Vec<u8>, RunError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        pipe.read_to_end(&mut buf)
            .await
            .map_err(|e| RunError::Io(format!("reading {name} of {program}: {e}")))?;
    }
    Ok(buf)
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ProcessOutput, RunError> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        // Pipes are drained alongside wait() so a chatty child cannot block on a full pipe.
        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    drain_pipe(stdout_handle.as_mut(), program, "stdout"),
                    drain_pipe(stderr_handle.as_mut(), program, "stderr"),
                );
                let status = status.map_err(|e| RunError::Io(format!("waiting for {program}: {e}")))?;
                let (stdout, stderr) = (stdout?, stderr?);
                Ok::<_, RunError>(ProcessOutput {
                    exit_code: status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                Err(RunError::Timeout(timeout))
            }
        }
    }
}
