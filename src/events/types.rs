//! Channel configuration and dispatch bookkeeping types.

use serde::{Deserialize, Serialize};

/// What a channel does when one of its listeners panics during emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The panic unwinds through `emit`; listeners after it do not run
    #[default]
    Propagate,
    /// The panic is caught and logged; remaining listeners still run
    Isolate,
}

/// Per-channel configuration
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Log a warning when an emit finds no listeners
    pub warn_when_idle: bool,
    /// Behavior when a listener panics
    pub failure_policy: FailurePolicy,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            warn_when_idle: true,
            failure_policy: FailurePolicy::Propagate,
        }
    }
}

impl ChannelOptions {
    pub fn warn_when_idle(mut self, warn: bool) -> Self {
        self.warn_when_idle = warn;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Outcome of a single emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Listeners that ran to completion
    pub delivered: usize,
    /// Listeners that panicked (only counted under [`FailurePolicy::Isolate`])
    pub failed: usize,
}

impl DispatchReport {
    /// True when the emit found nobody to deliver to
    pub fn is_idle(&self) -> bool {
        self.delivered == 0 && self.failed == 0
    }
}

/// Snapshot of one channel inside a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Registry key of the channel
    pub name: String,
    /// Persistent listeners currently registered
    pub listeners: usize,
    /// One-shot listeners waiting for the next emit
    pub once_listeners: usize,
}
