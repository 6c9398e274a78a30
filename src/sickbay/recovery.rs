//! Remediation for failed checks
//!
//! Each stage maps to one action. Process and display failures implicate the
//! supervised service directly. An endpoint failure may just be the content server,
//! so that one is repaired from the cheap end first.

use crate::clock::Clock;
use crate::config::WatchdogConfig;
use crate::error::Result;
use crate::sickbay::checker::{CheckResult, HealthProbe, Stage};
use crate::systemd::ServiceManager;
use std::fmt;
use tracing::{info, warn};

/// Action to take when a stage fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Restart the supervised service
    RestartService,
    /// Restart the dependent service, re-check the endpoint once, and restart the
    /// supervised service only if it is still unreachable
    RestartDependentThenVerify,
}

impl RecoveryAction {
    /// Remediation table keyed by failing stage
    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Process | Stage::Display => RecoveryAction::RestartService,
            Stage::Endpoint => RecoveryAction::RestartDependentThenVerify,
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryAction::RestartService => write!(f, "restart service"),
            RecoveryAction::RestartDependentThenVerify => {
                write!(f, "restart dependent, verify, escalate")
            }
        }
    }
}

/// What a remediation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remediation {
    /// Stage that failed
    pub stage: Stage,
    /// Why it failed
    pub reason: String,
    /// Action chosen from the table
    pub action: RecoveryAction,
    /// Units a restart was requested for, in order
    pub restarted: Vec<String>,
    /// Whether the endpoint re-check passed after the dependent restart
    pub recovered: bool,
}

/// Carry out the remediation for a failed stage
///
/// Restart requests are fire-and-forget. A rejected request stops the remediation:
/// the service manager is not accepting jobs, so further requests are pointless.
pub fn remediate(
    stage: Stage,
    reason: String,
    config: &WatchdogConfig,
    manager: &dyn ServiceManager,
    endpoint: &dyn HealthProbe,
    clock: &dyn Clock,
) -> Result<Remediation> {
    let action = RecoveryAction::for_stage(stage);
    let mut restarted = Vec::new();
    let mut recovered = false;

    match action {
        RecoveryAction::RestartService => {
            request_restart(manager, &config.service, &mut restarted)?;
        }
        RecoveryAction::RestartDependentThenVerify => {
            request_restart(manager, &config.dependent_service, &mut restarted)?;
            clock.sleep(config.recheck_delay);

            match endpoint.check(config) {
                CheckResult::Pass => {
                    info!(
                        unit = %config.dependent_service,
                        "endpoint recovered after dependent restart"
                    );
                    recovered = true;
                }
                CheckResult::Fail(still) => {
                    warn!(reason = %still, "endpoint still failing, escalating");
                    request_restart(manager, &config.service, &mut restarted)?;
                }
            }
        }
    }

    Ok(Remediation {
        stage,
        reason,
        action,
        restarted,
        recovered,
    })
}

fn request_restart(
    manager: &dyn ServiceManager,
    unit: &str,
    restarted: &mut Vec<String>,
) -> Result<()> {
    info!(unit, "requesting restart");
    manager.restart(unit)?;
    restarted.push(unit.to_string());
    Ok(())
}
