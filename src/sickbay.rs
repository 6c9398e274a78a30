//! Health checks and remediation for the kiosk stack
//!
//! Provides:
//! - The three ordered check stages and the short-circuiting pipeline runner
//! - Probe implementations for the browser process, the X display, and the endpoint
//! - Remediation keyed by failing stage, including verify-before-escalate

pub mod checker;
pub mod probes;
pub mod recovery;

pub use checker::{PipelineOutcome, Probes, Stage};
