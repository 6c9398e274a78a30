//! State gate
//!
//! Decides whether the supervised service is in a state where health checks mean
//! anything. Intentional stops and transitions are left alone; a freshly started
//! service gets a grace sleep before it is judged.

use crate::clock::Clock;
use crate::config::WatchdogConfig;
use crate::error::{Error, Result};
use crate::systemd::{ServiceManager, ServiceState};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What the gate decided for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Service is stopped on purpose; nothing to do
    Stopped,
    /// Service is between states; skip all checks
    Transitional(ServiceState),
    /// Run the checks, after the given grace sleep if any
    Proceed {
        state: ServiceState,
        grace: Option<Duration>,
    },
}

/// Query the service manager and decide, sleeping out any grace period
///
/// An `ActiveState` query error or an unrecognized state is returned as `Err`; the
/// caller treats both as infrastructure failures.
pub fn evaluate(
    manager: &dyn ServiceManager,
    clock: &dyn Clock,
    config: &WatchdogConfig,
) -> Result<GateDecision> {
    let unit = config.service.as_str();
    let active = manager.active_state(unit)?;

    if active == "inactive" {
        info!(unit, "service is inactive, leaving it alone");
        return Ok(GateDecision::Stopped);
    }

    let state = match manager.sub_state(unit) {
        Ok(sub) => ServiceState::classify(&active, &sub).ok_or_else(|| {
            Error::UnknownServiceState {
                unit: unit.to_string(),
                state: format!("{}/{}", active, sub),
            }
        })?,
        Err(e) => {
            warn!(unit, error = %e, "sub-state unavailable, assuming still starting");
            ServiceState::Activating
        }
    };

    if state.is_transitional() {
        info!(unit, %state, "service in transition, skipping checks");
        return Ok(GateDecision::Transitional(state));
    }

    let grace = grace_period(manager, clock, config);
    if let Some(duration) = grace {
        info!(unit, grace_ms = duration.as_millis() as u64, "waiting out grace period");
        clock.sleep(duration);
    }

    Ok(GateDecision::Proceed { state, grace })
}

/// Time since the service last became active, if it can be determined
fn uptime(manager: &dyn ServiceManager, clock: &dyn Clock, unit: &str) -> Option<Duration> {
    let entered = match manager.active_enter_monotonic(unit) {
        Ok(Some(entered)) => entered,
        Ok(None) => {
            debug!(unit, "no active-enter timestamp");
            return None;
        }
        Err(e) => {
            debug!(unit, error = %e, "active-enter timestamp query failed");
            return None;
        }
    };

    let Some(now) = clock.monotonic_now() else {
        debug!("monotonic clock unreadable");
        return None;
    };

    if entered > now {
        debug!(unit, ?entered, ?now, "active-enter timestamp is in the future");
        return None;
    }
    Some(now - entered)
}

/// Grace sleep owed before checks run, or `None` when the service is settled
fn grace_period(
    manager: &dyn ServiceManager,
    clock: &dyn Clock,
    config: &WatchdogConfig,
) -> Option<Duration> {
    let grace = match uptime(manager, clock, &config.service) {
        Some(up) if up < config.grace_threshold => {
            debug!(uptime_ms = up.as_millis() as u64, "service recently started");
            config.grace_sleep
        }
        Some(_) => return None,
        None => config.grace_fallback,
    };

    if grace.is_zero() { None } else { Some(grace) }
}
