//! Phase notifications for a sieve run.
//!
//! The core calls these from the thread that drives the run (never from the
//! workers). Every method defaults to a no-op, so implementors only override
//! what they report.

use tracing::{debug, info};

pub trait ProgressObserver {
    /// Base primes are ready
    fn base_sieve_done(&self, _base_primes: usize) {}

    /// Every planned segment has been queued for the workers
    fn segments_dispatched(&self, _segments: usize) {}

    /// One more segment result reached the aggregator
    fn segment_collected(&self, _received: usize, _expected: usize) {}

    /// All expected segment results have been received
    fn segments_collected(&self, _segments: usize) {}
}

/// Observer used when the caller registers none
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Reports phases as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn base_sieve_done(&self, base_primes: usize) {
        info!(base_primes, "base sieve done");
    }

    fn segments_dispatched(&self, segments: usize) {
        info!(segments, "segments dispatched");
    }

    fn segment_collected(&self, received: usize, expected: usize) {
        debug!(received, expected, "segment collected");
    }

    fn segments_collected(&self, segments: usize) {
        info!(segments, "segments collected");
    }
}
