//! Spawning engine commands and collecting their output

use crate::command::Command;
use crate::engine::EngineLocator;
use crate::error::{Error, Result, TERMINATED_EXIT_CODE};
use crate::user;
use async_io::Timer;
use futures::future::try_join;
use futures_lite::io::{AsyncRead, AsyncReadExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Runs built commands, one subprocess per call
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    locator: Arc<dyn EngineLocator>,
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    /// Create an executor for the engine found by `locator`
    pub fn new(locator: Arc<dyn EngineLocator>) -> Self {
        Self {
            locator,
            timeout: None,
        }
    }

    /// Kill the engine if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `command` and return its standard output split into lines.
    ///
    /// Lines are split with [`str::lines`]: a trailing newline does not produce a
    /// final empty entry and `\r\n` endings are stripped. When `run_as_user` is
    /// given on a platform that supports it, the command runs as that user.
    ///
    /// Fails before spawning with [`Error::InvalidCommandExecutable`] for an empty
    /// command and [`Error::InvalidResourceDirectory`] when the engine directory is
    /// missing. A non-zero exit becomes [`Error::ExecutionError`] with the full
    /// standard error text; a timeout or signal uses [`TERMINATED_EXIT_CODE`].
    pub async fn execute(&self, command: &Command, run_as_user: Option<&str>) -> Result<Vec<String>> {
        if command.is_empty() {
            return Err(Error::InvalidCommandExecutable);
        }
        self.locator.verify()?;

        let command = match run_as_user {
            Some(user) => user::run_as(command.clone(), user),
            None => command.clone(),
        };

        info!(command = %command.redacted(), "Running engine");
        let started = Instant::now();

        let mut child = command
            .prepare()
            .spawn()
            .map_err(|e| Error::spawn_failed(format!("Failed to spawn process: {}", e)))?;
        debug!(pid = child.id(), "Engine process started");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained together so a full stderr buffer cannot stall stdout
        let run = async {
            let (out, err) = try_join(read_stream(stdout), read_stream(stderr)).await?;
            let status = child.status().await?;
            Ok::<_, Error>((status, out, err))
        };

        let outcome = match self.timeout {
            Some(limit) => {
                futures_lite::future::or(async { Some(run.await) }, async {
                    Timer::after(limit).await;
                    None
                })
                .await
            }
            None => Some(run.await),
        };

        let Some(outcome) = outcome else {
            warn!(timeout = ?self.timeout, "Engine timed out, killing it");
            kill_tree(&mut child);
            let _ = child.status().await;
            return Err(Error::execution(
                TERMINATED_EXIT_CODE,
                format!("engine timed out after {:?}", started.elapsed()),
            ));
        };

        let (status, stdout, stderr) = outcome?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match status.code() {
            Some(0) => {
                info!(elapsed_ms, "Engine finished");
                Ok(stdout.lines().map(String::from).collect())
            }
            Some(code) => {
                warn!(exit_code = code, elapsed_ms, "Engine failed");
                Err(Error::execution(code, stderr))
            }
            None => {
                warn!(elapsed_ms, "Engine terminated by signal");
                Err(Error::execution(TERMINATED_EXIT_CODE, stderr))
            }
        }
    }

    /// Blocking form of [`ProcessExecutor::execute`]
    pub fn execute_blocking(&self, command: &Command, run_as_user: Option<&str>) -> Result<Vec<String>> {
        futures_lite::future::block_on(self.execute(command, run_as_user))
    }
}

/// Kill the shell and everything it started
fn kill_tree(child: &mut async_process::Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        // The shell leads its own process group (see `Command::prepare`)
        let pgid = Pid::from_raw(child.id() as i32);
        match killpg(pgid, Signal::SIGKILL) {
            Ok(()) => return,
            Err(e) => debug!("Failed to kill engine process group: {}", e),
        }
    }

    if let Err(e) = child.kill() {
        debug!("Failed to kill engine process: {}", e);
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
