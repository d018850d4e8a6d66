//! Progress notification port
//!
//! Defines the interface for reporting progress while expired votings are swept.

use consensus_domain::{ConfigurationId, FinalResult, RuleId};

/// Callback for progress updates during a sweep
///
/// Implementations live in the presentation layer.
pub trait SweepProgress: Send + Sync {
    /// Called once the open configurations have been inspected
    fn on_sweep_start(&self, expired_configurations: usize);

    /// Called when an expired configuration has been closed
    fn on_configuration_closed(&self, id: ConfigurationId);

    /// Called after each rule finalization attempt
    fn on_rule_finalized(&self, id: RuleId, result: Option<FinalResult>);

    /// Called when the sweep is done
    fn on_sweep_complete(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SweepProgress for NoProgress {
    fn on_sweep_start(&self, _expired_configurations: usize) {}
    fn on_configuration_closed(&self, _id: ConfigurationId) {}
    fn on_rule_finalized(&self, _id: RuleId, _result: Option<FinalResult>) {}
}
