//! Scoped execution of external tools.
//!
//! Every pipeline stage (compile, disassemble, reassemble, run-for-comparison)
//! goes through [`run_command`]: one child process, executed in an explicit
//! working directory, with captured output and a hard wall-clock timeout.
//!
//! The working directory is passed to the child via `Command::current_dir`
//! rather than chdir-ing the harness process, so concurrent runs can never
//! observe each other's directory state.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Captured outcome of one external command.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Lossy stdout, trimmed, for log lines and error messages.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` did not finish within {timeout:?} and was killed")]
    TimedOut { program: String, timeout: Duration },
    #[error("i/o error while running `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Run `program args...` in `cwd`, capturing stdout/stderr, enforcing `timeout`.
///
/// A non-zero exit is *not* an error here: callers decide whether that is a
/// stage failure. Only spawn failures, i/o failures, and timeouts are `Err`.
/// There are no retries at this layer.
pub fn run_command<S: AsRef<str>>(
    program: &Path,
    args: &[S],
    cwd: &Path,
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let program_name = program.display().to_string();
    let mut child = Command::new(program)
        .args(args.iter().map(|a| a.as_ref()))
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn { program: program_name.clone(), source })?;

    // Drain pipes on threads so a chatty child cannot fill a pipe and block
    // before we get to wait on it.
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdout_thread = std::thread::spawn(move || read_pipe(stdout_pipe));
    let stderr_thread = std::thread::spawn(move || read_pipe(stderr_pipe));

    let (status, timed_out) = wait_with_timeout(&mut child, timeout)
        .map_err(|source| ProcessError::Io { program: program_name.clone(), source })?;

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();

    if timed_out {
        return Err(ProcessError::TimedOut { program: program_name, timeout });
    }

    Ok(ProcessOutput { exit_code: exit_code_of(status), stdout, stderr })
}

/// Like [`run_command`] but folds the exit status into a bool: `Ok(true)` on
/// exit 0, `Ok(false)` on any other exit. Spawn/timeout problems stay `Err`.
pub fn run_ok<S: AsRef<str>>(
    program: &Path,
    args: &[S],
    cwd: &Path,
    timeout: Duration,
) -> Result<bool, ProcessError> {
    Ok(run_command(program, args, cwd, timeout)?.success())
}

fn read_pipe<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

/// Poll `try_wait` against a deadline; kill and reap the child on expiry.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<(ExitStatus, bool)> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            let _ = child.kill();
            let status = child.wait()?;
            return Ok((status, true));
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn exit_code_of(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt as _;
        status.signal()
    };
    #[cfg(not(unix))]
    let signal: Option<i32> = None;

    match status.code() {
        Some(code) => code,
        None => signal.map(|s| 128 + s).unwrap_or(1),
    }
}

/// Resolve a tool path from an environment variable with a default program
/// name looked up on `PATH`.
pub fn resolve_tool(env_var: &str, default: &str) -> PathBuf {
    std::env::var_os(env_var).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(default))
}
