use crate::error::{Result, SieveError};

/// Default segment width: a 32KB bit-vector, one bit per number (fits in L1 cache)
pub const DEFAULT_SEGMENT_WIDTH: u64 = 32 * 1024 * 8; // 262,144 numbers

/// Default size of the worker pool
pub const DEFAULT_WORKERS: usize = 4;

/// Parameters for one sieve run.
///
/// Passed by value into the entry point, so runs with different parameters
/// can coexist in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SieveConfig {
    /// Inclusive upper bound N
    pub limit: u64,
    /// Numbers per segment (the final segment may be shorter)
    pub segment_width: u64,
    /// Number of worker threads
    pub workers: usize,
}

impl SieveConfig {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            segment_width: DEFAULT_SEGMENT_WIDTH,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_segment_width(mut self, segment_width: u64) -> Self {
        self.segment_width = segment_width;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject zero widths and empty pools. Values are never clamped here.
    pub fn validate(&self) -> Result<()> {
        if self.segment_width == 0 {
            return Err(SieveError::InvalidConfiguration(
                "segment width must be greater than 0".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(SieveError::InvalidConfiguration(
                "worker count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
