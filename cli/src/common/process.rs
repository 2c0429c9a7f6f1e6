//! # unarchive Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! This module runs the external programs that do the actual decompression
//! (`unzip`, `tar`). The extractor never spawns processes itself; it hands a
//! [`CommandSpec`] to a [`ProcessRunner`] and interprets the [`RunError`] it
//! gets back.
//!
//! ## Architecture
//!
//! - **`CommandSpec`**: program plus arguments, built by the caller.
//! - **`ProcessRunner`**: the capability trait. Implementations launch the
//!   command, await its exit, and stop it when the cancellation token fires.
//! - **`SystemRunner`**: the real implementation on `tokio::process`. Stdout is
//!   discarded, stderr is captured for error messages, and the child is
//!   killed (and reaped) on cancellation or when the optional timeout expires.
//!
//! ## Usage
//!
//! ```rust
//! let runner = SystemRunner::new(Some(Duration::from_secs(600)));
//! let spec = CommandSpec::new("tar").arg("-xzf").arg(&archive).arg("-C").arg(&scratch);
//! runner.run(&spec, &CancellationToken::new()).await?;
//! ```
//!
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A program invocation: the program name or path and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Why a command did not complete successfully.
#[derive(Debug)]
pub enum RunError {
    /// The process could not be started (e.g. the program was not found).
    Launch(io::Error),
    /// The process ran and exited unsuccessfully.
    Failed { status: ExitStatus, stderr: String },
    /// The process outlived the configured timeout and was killed.
    TimedOut(Duration),
    /// The cancellation token fired and the process was killed.
    Cancelled,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Launch(e) if e.kind() == io::ErrorKind::NotFound => {
                write!(f, "command not found ({})", e)
            }
            RunError::Launch(e) => write!(f, "could not be launched ({})", e),
            RunError::Failed { status, .. } => write!(f, "{}", status),
            RunError::TimedOut(limit) => write!(f, "timed out after {}s", limit.as_secs()),
            RunError::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Capability for running an external command to completion.
#[allow(async_fn_in_trait)] // Only used through generics inside this binary.
pub trait ProcessRunner {
    /// Runs `spec` and resolves once it has exited.
    ///
    /// Returns `Ok(())` only for a successful exit status. When `cancel`
    /// fires, the process must be terminated before `RunError::Cancelled` is
    /// returned.
    async fn run(&self, spec: &CommandSpec, cancel: &CancellationToken) -> Result<(), RunError>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

enum Interrupted {
    Cancelled,
    TimedOut(Duration),
}

impl ProcessRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec, cancel: &CancellationToken) -> Result<(), RunError> {
        debug!("Running external command: {}", spec);
        let mut child = Command::new(spec.program())
            .args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RunError::Launch)?;

        // Drain stderr concurrently so a chatty process never blocks on a full pipe.
        let stderr_pipe = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf).await;
            }
            buf
        });

        let limit = self.timeout;
        let deadline = async move {
            match limit {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    limit
                }
                None => std::future::pending().await,
            }
        };

        let waited = tokio::select! {
            status = child.wait() => Ok(status),
            _ = cancel.cancelled() => Err(Interrupted::Cancelled),
            limit = deadline => Err(Interrupted::TimedOut(limit)),
        };

        match waited {
            Ok(status) => {
                let status = status.map_err(RunError::Launch)?;
                let stderr = stderr_task.await.unwrap_or_default();
                let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
                debug!("'{}' exited with {}", spec.program(), status);
                if status.success() {
                    Ok(())
                } else {
                    Err(RunError::Failed { status, stderr })
                }
            }
            Err(interrupted) => {
                // kill() also waits, so the process is gone before we return.
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill '{}': {}", spec.program, e);
                }
                stderr_task.abort();
                match interrupted {
                    Interrupted::Cancelled => Err(RunError::Cancelled),
                    Interrupted::TimedOut(limit) => Err(RunError::TimedOut(limit)),
                }
            }
        }
    }
}
