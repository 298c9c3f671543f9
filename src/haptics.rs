//! Haptic feedback capability
//!
//! The router pulses the operator's device on every accepted command and
//! on mode changes. The capability is injected; the core never depends on
//! a real vibration motor being present, and [`NoopHaptics`] satisfies
//! every contract.

use std::sync::Arc;
use tracing::debug;

/// Vibration pattern sink. A pattern is a sequence of on-durations in
/// milliseconds; how off-gaps are rendered is up to the implementation.
pub trait HapticFeedback: Send + Sync {
    fn pulse(&self, pattern: &[u64]);
}

pub type SharedHaptics = Arc<dyn HapticFeedback>;

/// Does nothing. The default when haptics are disabled or unavailable.
pub struct NoopHaptics;

impl HapticFeedback for NoopHaptics {
    fn pulse(&self, _pattern: &[u64]) {}
}

/// Traces every pattern; the gateway binary uses this so the REPL shows
/// when the device would buzz.
pub struct LogHaptics;

impl HapticFeedback for LogHaptics {
    fn pulse(&self, pattern: &[u64]) {
        debug!(?pattern, "haptic pulse");
    }
}
