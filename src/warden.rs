//! The Warden - one watchdog run
//!
//! A run is strictly sequential:
//! 1. Take the run lock, or exit quietly if another run holds it
//! 2. Resolve configuration
//! 3. Pass the state gate
//! 4. Run the check pipeline
//! 5. Remediate the first failing stage
//!
//! Every path ends in a [`RunOutcome`]; nothing here turns into a non-zero exit.

use std::fmt;
use std::path::Path;

use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::config::WatchdogConfig;
use crate::error::Result;
use crate::gate::{self, GateDecision};
use crate::lock::{LockAttempt, RunLock};
use crate::sickbay::recovery::{self, Remediation};
use crate::sickbay::checker::run_pipeline;
use crate::sickbay::{PipelineOutcome, Probes, Stage};
use crate::systemd::{ServiceManager, ServiceState};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run holds the lock
    Contended,
    /// Supervised service is stopped on purpose
    ServiceStopped,
    /// Supervised service is between states
    Transitional(ServiceState),
    /// Every check passed
    Healthy,
    /// A check failed and remediation was carried out
    Remediated(Remediation),
    /// Infrastructure failure; the rest of the run was abandoned
    Aborted(String),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Contended => write!(f, "another run in progress"),
            RunOutcome::ServiceStopped => write!(f, "service stopped, nothing to do"),
            RunOutcome::Transitional(state) => write!(f, "service {}, checks skipped", state),
            RunOutcome::Healthy => write!(f, "healthy"),
            RunOutcome::Remediated(r) if r.recovered => write!(
                f,
                "{} failed ({}), recovered after restarting {}",
                r.stage,
                r.reason,
                r.restarted.join(", ")
            ),
            RunOutcome::Remediated(r) => write!(
                f,
                "{} failed ({}), restarted {}",
                r.stage,
                r.reason,
                r.restarted.join(", ")
            ),
            RunOutcome::Aborted(reason) => write!(f, "aborted: {}", reason),
        }
    }
}

/// Runs the watchdog against a service manager, a set of probes, and a clock
pub struct Warden<'a> {
    manager: &'a dyn ServiceManager,
    probes: Probes<'a>,
    clock: &'a dyn Clock,
}

impl<'a> Warden<'a> {
    pub fn new(manager: &'a dyn ServiceManager, probes: Probes<'a>, clock: &'a dyn Clock) -> Self {
        Self {
            manager,
            probes,
            clock,
        }
    }

    /// One complete run under the lock at `lock_path`
    ///
    /// `resolve` is only called once the lock is held, so a contended run never
    /// touches configuration.
    pub fn run<F>(&self, lock_path: &Path, resolve: F) -> RunOutcome
    where
        F: FnOnce() -> WatchdogConfig,
    {
        let _lock = match RunLock::try_acquire(lock_path) {
            Ok(LockAttempt::Acquired(lock)) => {
                debug!(lock = %lock.path().display(), "lock acquired");
                lock
            }
            Ok(LockAttempt::Contended) => {
                info!(lock = %lock_path.display(), "another run holds the lock, exiting");
                return RunOutcome::Contended;
            }
            Err(e) => {
                let outcome = RunOutcome::Aborted(e.to_string());
                error!(%outcome, "run finished");
                return outcome;
            }
        };

        let config = resolve();
        let outcome = self
            .patrol(&config)
            .unwrap_or_else(|e| RunOutcome::Aborted(e.to_string()));

        match &outcome {
            RunOutcome::Aborted(_) => error!(%outcome, "run finished"),
            _ => info!(%outcome, "run finished"),
        }
        outcome
    }

    /// Gate, check, and remediate with an already resolved configuration
    pub fn patrol(&self, config: &WatchdogConfig) -> Result<RunOutcome> {
        match gate::evaluate(self.manager, self.clock, config)? {
            GateDecision::Stopped => return Ok(RunOutcome::ServiceStopped),
            GateDecision::Transitional(state) => return Ok(RunOutcome::Transitional(state)),
            GateDecision::Proceed { state, grace } => {
                debug!(%state, ?grace, "gate passed, running checks");
            }
        }

        let (stage, reason) = match run_pipeline(&self.probes, config) {
            PipelineOutcome::Healthy => return Ok(RunOutcome::Healthy),
            PipelineOutcome::Failed { stage, reason } => (stage, reason),
        };

        let remediation = recovery::remediate(
            stage,
            reason,
            config,
            self.manager,
            self.probes.for_stage(Stage::Endpoint),
            self.clock,
        )?;
        Ok(RunOutcome::Remediated(remediation))
    }
}
