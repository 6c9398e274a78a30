//! Probe implementations against the real system

use crate::command::run_bounded;
use crate::config::{Account, WatchdogConfig};
use crate::sickbay::checker::{CheckResult, HealthProbe};
use chrono_machines::{BackoffStrategy, ExponentialBackoff};
use crossbeam::channel;
use nix::unistd::geteuid;
use rand::rng;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};
use sysinfo::{ProcessRefreshKind, System};
use tracing::debug;

const USER_AGENT: &str = concat!("kiosk-watchdog/", env!("CARGO_PKG_VERSION"));

/// Run `f` on a helper thread and give up after `timeout`
///
/// A probe that overruns is abandoned, not killed; the thread ends with the process.
fn bounded<T, F>(timeout: Duration, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = channel::bounded(1);
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(timeout).ok()
}

/// PIDs of processes owned by `uid` whose command line contains `signature`
pub fn matching_processes(uid: u32, signature: &str) -> Vec<u32> {
    // A bare refresh leaves owner and command line unset
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessRefreshKind::everything());

    let mut pids: Vec<u32> = system
        .processes()
        .iter()
        .filter(|(_, p)| p.user_id().is_some_and(|owner| **owner == uid))
        .filter(|(_, p)| p.cmd().join(" ").contains(signature))
        .map(|(pid, _)| pid.as_u32())
        .collect();
    pids.sort_unstable();
    pids
}

/// Stage 1: the browser process is running under the service account
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTable;

impl HealthProbe for ProcessTable {
    fn check(&self, config: &WatchdogConfig) -> CheckResult {
        let Some(uid) = config.account.uid else {
            return CheckResult::Fail(format!(
                "service account '{}' does not exist",
                config.account.name
            ));
        };

        let signature = config.process_match.clone();
        match bounded(config.process_timeout, move || {
            matching_processes(uid, &signature)
        }) {
            Some(pids) if !pids.is_empty() => {
                debug!(?pids, "browser process found");
                CheckResult::Pass
            }
            Some(_) => CheckResult::Fail(format!(
                "no process of '{}' matches '{}'",
                config.account.name, config.process_match
            )),
            None => CheckResult::Fail(format!(
                "process scan timed out after {}ms",
                config.process_timeout.as_millis()
            )),
        }
    }
}

/// Stage 2: the X display answers the probe command
#[derive(Debug, Default, Clone, Copy)]
pub struct XDisplay;

impl XDisplay {
    /// Build the probe command, switching to the service account when needed
    pub fn command(
        account: &Account,
        running_as: u32,
        display: &str,
        authority: &Path,
        probe: &[String],
    ) -> Option<Command> {
        let (program, args) = probe.split_first()?;

        if account.uid == Some(running_as) {
            let mut cmd = Command::new(program);
            cmd.args(args)
                .env("DISPLAY", display)
                .env("XAUTHORITY", authority);
            return Some(cmd);
        }

        let mut cmd = Command::new("runuser");
        cmd.args(["-u", account.name.as_str(), "--", "env"])
            .arg(format!("DISPLAY={}", display))
            .arg(format!("XAUTHORITY={}", authority.display()))
            .arg(program)
            .args(args);
        Some(cmd)
    }
}

impl HealthProbe for XDisplay {
    fn check(&self, config: &WatchdogConfig) -> CheckResult {
        let Some(mut cmd) = Self::command(
            &config.account,
            geteuid().as_raw(),
            &config.display,
            &config.authority,
            &config.display_probe,
        ) else {
            return CheckResult::Fail("display probe command is empty".to_string());
        };

        match run_bounded(&mut cmd, config.display_timeout) {
            Ok(output) if output.success => CheckResult::Pass,
            Ok(output) => CheckResult::Fail(format!(
                "display {} unresponsive (authority {}): {}",
                config.display,
                config.authority.display(),
                output.diagnostic()
            )),
            Err(e) => CheckResult::Fail(format!("display {}: {}", config.display, e)),
        }
    }
}

/// Stage 3: the local endpoint answers with a 2xx status
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpEndpoint;

impl HttpEndpoint {
    fn retry_backoff(retries: u8) -> ExponentialBackoff {
        ExponentialBackoff::new()
            .base_delay_ms(200)
            .max_delay_ms(1000)
            .multiplier(2.0)
            .max_attempts(retries.saturating_add(1))
            .jitter_factor(0.2)
    }
}

/// Connection refused means the server is not listening yet; worth another try
fn is_refused(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::Io(e) => e.kind() == ErrorKind::ConnectionRefused,
        ureq::Error::ConnectionFailed => true,
        _ => false,
    }
}

impl HealthProbe for HttpEndpoint {
    fn check(&self, config: &WatchdogConfig) -> CheckResult {
        let url = config.endpoint_url.as_str();
        let deadline = Instant::now() + config.http_timeout;
        let backoff = Self::retry_backoff(config.http_retries);
        let mut rng = rng();
        let mut attempt: u8 = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return CheckResult::Fail(format!(
                    "GET {} timed out after {}ms",
                    url,
                    config.http_timeout.as_millis()
                ));
            }

            let agent: ureq::Agent = ureq::Agent::config_builder()
                .timeout_connect(Some(config.connect_timeout.min(remaining)))
                .timeout_global(Some(remaining))
                .http_status_as_error(false)
                .build()
                .into();

            attempt = attempt.saturating_add(1);
            let response = agent
                .get(url)
                .header("User-Agent", USER_AGENT)
                .header("Connection", "close")
                .call();

            match response {
                Ok(resp) if resp.status().is_success() => return CheckResult::Pass,
                Ok(resp) => {
                    return CheckResult::Fail(format!(
                        "GET {} returned HTTP {}",
                        url,
                        resp.status().as_u16()
                    ));
                }
                Err(e) if is_refused(&e) && attempt <= config.http_retries => {
                    let delay = backoff
                        .delay(attempt, &mut rng)
                        .map(Duration::from_millis)
                        .unwrap_or(Duration::from_millis(200));
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    debug!(attempt, ?delay, "connection refused, retrying");
                    thread::sleep(delay.min(remaining));
                }
                Err(e) => return CheckResult::Fail(format!("GET {} failed: {}", url, e)),
            }
        }
    }
}
