use crate::error::QuantError;
use std::fmt;

/// Which half of the shrink pipeline a pass belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The external quantizer.
    Quantizer,
    /// The in-process re-encode used when the quantizer gained nothing.
    Fallback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Quantizer => write!(f, "quantizer"),
            Stage::Fallback => write!(f, "fallback"),
        }
    }
}

/// Hook for watching a shrink as it runs. All methods default to no-ops.
///
/// Failed passes never abort a shrink, so this is the only place they surface.
pub trait ShrinkObserver: Send + Sync {
    fn pass_finished(&self, _stage: Stage, _pass: u32, _len: usize) {}

    fn pass_failed(&self, _stage: Stage, _pass: u32, _error: &QuantError) {}

    fn stage_finished(&self, _stage: Stage, _passes: u32, _failures: u32) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl ShrinkObserver for SilentObserver {}

/// Routes shrink events through the crate logger.
///
/// Individual passes are logged at verbose level. A stage where every pass
/// failed is reported as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ShrinkObserver for LogObserver {
    fn pass_finished(&self, stage: Stage, pass: u32, len: usize) {
        crate::verbose!("{} pass {}: {} bytes", stage, pass, len);
    }

    fn pass_failed(&self, stage: Stage, pass: u32, error: &QuantError) {
        crate::verbose!("{} pass {} failed: {}", stage, pass, error);
    }

    fn stage_finished(&self, stage: Stage, passes: u32, failures: u32) {
        if passes > 0 && failures == passes {
            crate::warn!(
                "{} failed on all {} pass(es); input left unchanged by this stage",
                stage,
                passes
            );
        }
    }
}
