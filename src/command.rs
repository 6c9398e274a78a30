//! Bounded subprocess execution
//!
//! Every external command the watchdog runs (service manager queries, restart
//! requests, display probes) goes through [`run_bounded`], so no call can block a
//! run past its timeout.

use crate::error::{Error, Result};
use crossbeam::channel::{self, Receiver};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a child to exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Minimum wait for output after the child has exited
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the command exited with status 0
    pub success: bool,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// First non-empty line of stderr, falling back to stdout
    pub fn diagnostic(&self) -> String {
        self.stderr
            .lines()
            .chain(self.stdout.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no output")
            .to_string()
    }
}

/// Render a command as a shell-like string for logs and errors
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run a command, killing it if it does not finish within `timeout`
///
/// Output is read on helper threads while the child runs, so a chatty command
/// cannot stall on a full pipe.
pub fn run_bounded(cmd: &mut Command, timeout: Duration) -> Result<CommandOutput> {
    let command = describe(cmd);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::CommandFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

    let deadline = Instant::now() + timeout;
    let stdout = read_pipe(child.stdout.take());
    let stderr = read_pipe(child.stderr.take());

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(CommandOutput {
                    success: status.success(),
                    stdout: collect(&stdout, deadline),
                    stderr: collect(&stderr, deadline),
                });
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait(); // Reap the zombie
                    return Err(Error::CommandTimeout {
                        command,
                        timeout_ms: timeout.as_millis(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::CommandFailed {
                    command,
                    message: format!("Failed to wait for process: {}", e),
                });
            }
        }
    }
}

/// Drain a pipe to EOF on a helper thread
fn read_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = channel::bounded(1);
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Wait for a drained pipe until the deadline
///
/// A grandchild that inherited the pipe can keep it open after the child exits;
/// its output is given up rather than waited for.
fn collect(rx: &Receiver<String>, deadline: Instant) -> String {
    let wait = deadline
        .saturating_duration_since(Instant::now())
        .max(DRAIN_GRACE);
    rx.recv_timeout(wait).unwrap_or_default()
}
