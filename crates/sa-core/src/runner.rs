//! Script execution in a child process with a wall-clock limit.
//!
//! The source is written to a private temp directory and handed to the
//! configured interpreter. The child gets its own process group so the
//! timeout path can kill everything it spawned, and it is reaped before
//! `execute` returns.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sa_protocol::ExecutionResult;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::config::RunnerConfig;
use crate::error::RunError;

/// How long to wait for the output pipes to drain once the child is gone.
const OUTPUT_GRACE: Duration = Duration::from_secs(2);

/// Bytes read so far from one pipe. Survives an aborted reader.
type Captured = Arc<Mutex<Vec<u8>>>;

pub struct ScriptRunner {
    interpreter: String,
    file_suffix: String,
    timeout: Duration,
    check_args: Vec<String>,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::from_config(&RunnerConfig::default())
    }
}

impl ScriptRunner {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            file_suffix: config.file_suffix.clone(),
            timeout: config.timeout(),
            check_args: config.check_args.clone(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments for the pre-run syntax check. Empty disables the check.
    pub fn with_check_args(mut self, args: Vec<String>) -> Self {
        self.check_args = args;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `source` and capture its output.
    ///
    /// `cwd` sets the child's working directory; `None` inherits ours.
    /// A non-zero exit or a timeout is reported in the result, not as an
    /// error. Errors mean the script never ran.
    pub async fn execute(
        &self,
        source: &str,
        cwd: Option<&Path>,
    ) -> Result<ExecutionResult, RunError> {
        let dir = tempfile::Builder::new()
            .prefix("scriptagent")
            .tempdir()
            .map_err(|e| RunError::Launch(format!("failed to create temp dir: {e}")))?;
        let script = dir.path().join(format!("script{}", self.file_suffix));
        tokio::fs::write(&script, source)
            .await
            .map_err(|e| RunError::Launch(format!("failed to write script: {e}")))?;

        if !self.check_args.is_empty() {
            let check = self.run_process(&self.check_args, &script, cwd).await?;
            if check.timed_out {
                return Err(RunError::Launch("syntax check timed out".to_string()));
            }
            if !check.success() {
                return Err(RunError::Launch(format!(
                    "syntax check failed:\n{}",
                    check.stderr.trim_end()
                )));
            }
        }

        tracing::info!(
            interpreter = %self.interpreter,
            bytes = source.len(),
            timeout_ms = self.timeout.as_millis() as u64,
            "script_started"
        );

        let result = self.run_process(&[], &script, cwd).await?;

        tracing::info!(
            interpreter = %self.interpreter,
            exit_code = ?result.exit_code,
            timed_out = result.timed_out,
            duration_ms = result.duration.as_millis() as u64,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "script_finished"
        );

        Ok(result)
    }

    async fn run_process(
        &self,
        args: &[String],
        script: &Path,
        cwd: Option<&Path>,
    ) -> Result<ExecutionResult, RunError> {
        let started = Instant::now();

        let mut command = Command::new(&self.interpreter);
        command
            .args(args)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| {
            RunError::Launch(format!("failed to start '{}': {e}", self.interpreter))
        })?;
        let pid = child.id();

        let stdout_buf = Captured::default();
        let stderr_buf = Captured::default();
        let stdout_task = tokio::spawn(read_all(child.stdout.take(), Arc::clone(&stdout_buf)));
        let stderr_task = tokio::spawn(read_all(child.stderr.take(), Arc::clone(&stderr_buf)));

        let (exit_code, timed_out) = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => {
                let status = status.map_err(|e| {
                    RunError::Launch(format!("failed waiting for '{}': {e}", self.interpreter))
                })?;
                // Anything the script left running in its group would hold
                // the pipes open.
                kill_process_group(pid);
                (status.code(), false)
            }
            Err(_) => {
                tracing::warn!(
                    interpreter = %self.interpreter,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "script_timed_out"
                );
                kill_process_group(pid);
                let _ = child.kill().await;
                let _ = child.wait().await;
                (None, true)
            }
        };

        let stdout = join_output(stdout_task, &stdout_buf).await;
        let stderr = join_output(stderr_task, &stderr_buf).await;

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code,
            timed_out,
            duration: started.elapsed(),
        })
    }
}

/// Read a script from disk, relative to the current working directory.
pub async fn read_local_script(path: &Path) -> Result<String, RunError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            RunError::FileNotFound(path.to_path_buf())
        } else {
            RunError::Read {
                path: PathBuf::from(path),
                source: e,
            }
        }
    })
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>, captured: Captured) {
    let Some(mut reader) = reader else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if let Ok(mut buf) = captured.lock() {
                    buf.extend_from_slice(&chunk[..n]);
                }
            }
        }
    }
}

/// Wait briefly for the reader to hit EOF, then take whatever it captured.
async fn join_output(mut handle: JoinHandle<()>, captured: &Captured) -> String {
    if tokio::time::timeout(OUTPUT_GRACE, &mut handle).await.is_err() {
        handle.abort();
    }
    let bytes = captured.lock().map(|buf| buf.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // The child leads its own group (process_group(0)), so its pid is the pgid.
        unsafe {
            libc::killpg(pid as libc::pid_t, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
