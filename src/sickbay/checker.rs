//! Check stages and the pipeline runner
//!
//! Stages run strictly in [`Stage::ALL`] order and the runner stops at the first
//! failure. Each probe enforces its own timeout and reports a timeout as a plain
//! failure, so a stage can never be skipped or left undecided.

use crate::config::WatchdogConfig;
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

/// One stage of the health pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Browser process owned by the service account is running
    Process,
    /// X display answers a trivial query
    Display,
    /// Local web endpoint answers HTTP
    Endpoint,
}

impl Stage {
    /// Evaluation order
    pub const ALL: [Stage; 3] = [Stage::Process, Stage::Display, Stage::Endpoint];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Process => "process",
            Stage::Display => "display",
            Stage::Endpoint => "endpoint",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a single stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Pass,
    Fail(String),
}

/// A single health probe
pub trait HealthProbe {
    /// Run the probe against the resolved configuration
    ///
    /// Must return within the stage's configured timeout.
    fn check(&self, config: &WatchdogConfig) -> CheckResult;
}

/// The probe used for each stage
#[derive(Clone, Copy)]
pub struct Probes<'a> {
    pub process: &'a dyn HealthProbe,
    pub display: &'a dyn HealthProbe,
    pub endpoint: &'a dyn HealthProbe,
}

impl<'a> Probes<'a> {
    pub fn for_stage(&self, stage: Stage) -> &'a dyn HealthProbe {
        match stage {
            Stage::Process => self.process,
            Stage::Display => self.display,
            Stage::Endpoint => self.endpoint,
        }
    }
}

/// Result of running the whole pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage passed
    Healthy,
    /// The first failing stage and its reason
    Failed { stage: Stage, reason: String },
}

/// Run stages in order, stopping at the first failure
pub fn run_pipeline(probes: &Probes<'_>, config: &WatchdogConfig) -> PipelineOutcome {
    for stage in Stage::ALL {
        let start = Instant::now();
        let result = probes.for_stage(stage).check(config);
        let elapsed_ms = start.elapsed().as_millis();

        match result {
            CheckResult::Pass => {
                debug!(%stage, elapsed_ms, "check passed");
            }
            CheckResult::Fail(reason) => {
                warn!(%stage, elapsed_ms, reason = %reason, "check failed");
                return PipelineOutcome::Failed { stage, reason };
            }
        }
    }

    PipelineOutcome::Healthy
}
