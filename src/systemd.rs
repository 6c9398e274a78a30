//! Service manager interface
//!
//! The watchdog only ever reads three unit properties and requests restarts. The
//! [`ServiceManager`] trait is the seam the run logic is written against; the real
//! implementation shells out to `systemctl` with every call bounded by a timeout.

use crate::command::{describe, run_bounded};
use crate::error::{Error, Result};
use std::cell::Cell;
use std::fmt;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

/// Operations the watchdog needs from the service manager
pub trait ServiceManager {
    /// `ActiveState` of the unit, e.g. `active`, `inactive`, `activating`
    fn active_state(&self, unit: &str) -> Result<String>;

    /// `SubState` of the unit, e.g. `running`, `start`, `auto-restart`
    fn sub_state(&self, unit: &str) -> Result<String>;

    /// `ActiveEnterTimestampMonotonic` as a `CLOCK_MONOTONIC` offset
    ///
    /// `Ok(None)` means the manager answered but has no usable timestamp.
    fn active_enter_monotonic(&self, unit: &str) -> Result<Option<Duration>>;

    /// Queue a restart without waiting for it to finish
    fn restart(&self, unit: &str) -> Result<()>;
}

impl<T: ServiceManager + ?Sized> ServiceManager for &T {
    fn active_state(&self, unit: &str) -> Result<String> {
        (**self).active_state(unit)
    }

    fn sub_state(&self, unit: &str) -> Result<String> {
        (**self).sub_state(unit)
    }

    fn active_enter_monotonic(&self, unit: &str) -> Result<Option<Duration>> {
        (**self).active_enter_monotonic(unit)
    }

    fn restart(&self, unit: &str) -> Result<()> {
        (**self).restart(unit)
    }
}

/// Supervised service state as seen by the state gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Stopped, usually on purpose
    Inactive,
    /// Start jobs still running
    Activating,
    /// Up and running
    Active,
    /// Stopped after an error, no restart pending
    Failed,
    /// Waiting out `RestartSec` before the next automatic start
    AutoRestarting,
    /// Stop jobs running
    Deactivating,
    /// Reload in progress
    Reloading,
}

impl ServiceState {
    /// Combine `ActiveState` and `SubState` into one state
    ///
    /// Returns `None` for states systemd does not document for service units.
    pub fn classify(active: &str, sub: &str) -> Option<Self> {
        if matches!(sub, "auto-restart" | "auto-restart-queued") {
            return Some(ServiceState::AutoRestarting);
        }

        match active {
            "inactive" => Some(ServiceState::Inactive),
            "failed" => Some(ServiceState::Failed),
            "activating" => Some(ServiceState::Activating),
            "deactivating" => Some(ServiceState::Deactivating),
            "reloading" | "refreshing" => Some(ServiceState::Reloading),
            "active" => match sub {
                "start-pre" | "start" | "start-post" | "condition" => {
                    Some(ServiceState::Activating)
                }
                _ => Some(ServiceState::Active),
            },
            _ => None,
        }
    }

    /// Whether the service is between stable states and must not be judged
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            ServiceState::Activating
                | ServiceState::AutoRestarting
                | ServiceState::Deactivating
                | ServiceState::Reloading
        )
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Inactive => "inactive",
            ServiceState::Activating => "activating",
            ServiceState::Active => "active",
            ServiceState::Failed => "failed",
            ServiceState::AutoRestarting => "auto-restarting",
            ServiceState::Deactivating => "deactivating",
            ServiceState::Reloading => "reloading",
        };
        write!(f, "{}", s)
    }
}

/// Parse a systemd monotonic timestamp in microseconds; `0` means "never"
pub fn parse_monotonic(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(usec) => Some(Duration::from_micros(usec)),
    }
}

/// Bound on each `systemctl` call until configuration says otherwise
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// `systemctl`-backed service manager
#[derive(Debug, Clone)]
pub struct Systemctl {
    timeout: Cell<Duration>,
}

impl Systemctl {
    /// Create a client whose calls are each bounded by `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: Cell::new(timeout),
        }
    }

    /// Change the per-call bound, e.g. once configuration has been resolved
    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout.set(timeout);
    }

    fn show(&self, unit: &str, property: &str) -> Result<String> {
        let mut cmd = Command::new("systemctl");
        cmd.args(["show", "--property", property, "--value", unit]);
        debug!(command = %describe(&cmd), "querying service manager");

        let output = run_bounded(&mut cmd, self.timeout.get()).map_err(|e| Error::ServiceQuery {
            unit: unit.to_string(),
            message: e.to_string(),
        })?;

        if !output.success {
            return Err(Error::ServiceQuery {
                unit: unit.to_string(),
                message: output.diagnostic(),
            });
        }

        Ok(output.stdout.trim().to_string())
    }
}

impl ServiceManager for Systemctl {
    fn active_state(&self, unit: &str) -> Result<String> {
        let state = self.show(unit, "ActiveState")?;
        if state.is_empty() {
            return Err(Error::ServiceQuery {
                unit: unit.to_string(),
                message: "empty ActiveState".to_string(),
            });
        }
        Ok(state)
    }

    fn sub_state(&self, unit: &str) -> Result<String> {
        self.show(unit, "SubState")
    }

    fn active_enter_monotonic(&self, unit: &str) -> Result<Option<Duration>> {
        let value = self.show(unit, "ActiveEnterTimestampMonotonic")?;
        Ok(parse_monotonic(&value))
    }

    fn restart(&self, unit: &str) -> Result<()> {
        let mut cmd = Command::new("systemctl");
        cmd.args(["restart", "--no-block", unit]);

        let output = run_bounded(&mut cmd, self.timeout.get()).map_err(|e| Error::RestartFailed {
            unit: unit.to_string(),
            message: e.to_string(),
        })?;

        if !output.success {
            return Err(Error::RestartFailed {
                unit: unit.to_string(),
                message: output.diagnostic(),
            });
        }
        Ok(())
    }
}

/// Wrapper that answers queries from the inner manager but only logs restarts
#[derive(Debug, Clone)]
pub struct DryRun<M> {
    inner: M,
}

impl<M: ServiceManager> DryRun<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M: ServiceManager> ServiceManager for DryRun<M> {
    fn active_state(&self, unit: &str) -> Result<String> {
        self.inner.active_state(unit)
    }

    fn sub_state(&self, unit: &str) -> Result<String> {
        self.inner.sub_state(unit)
    }

    fn active_enter_monotonic(&self, unit: &str) -> Result<Option<Duration>> {
        self.inner.active_enter_monotonic(unit)
    }

    fn restart(&self, unit: &str) -> Result<()> {
        info!(unit, "dry run: restart not issued");
        Ok(())
    }
}
