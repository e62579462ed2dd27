//! Parallel segmented Sieve of Eratosthenes.
//!
//! Base primes up to sqrt(N) are computed once, [0, N] is split into
//! fixed-width segments, a pool of worker threads sieves the segments with
//! private bit-vectors, and the per-segment results are merged and sorted into
//! one ascending list.
//!
//! ```no_run
//! let primes = psieve::compute_primes(100, 25, 4).unwrap();
//! assert_eq!(primes.len(), 25);
//! ```

pub mod aggregate;
pub mod base;
pub mod config;
pub mod error;
pub mod pool;
pub mod progress;
pub mod segment;
pub mod storage;
pub mod verify;

use tracing::debug;

pub use base::{BasePrimes, base_primes};
pub use config::{DEFAULT_SEGMENT_WIDTH, DEFAULT_WORKERS, SieveConfig};
pub use error::{Result, SieveError};
pub use progress::{NoProgress, ProgressObserver, TracingProgress};
pub use segment::{Segment, SegmentPlan, SegmentResult, sieve_segment};

use pool::WorkerPool;

/// All primes in [2, n], ascending.
///
/// Fails with `InvalidConfiguration` when `segment_width` or `worker_count`
/// is zero.
pub fn compute_primes(n: u64, segment_width: u64, worker_count: usize) -> Result<Vec<u64>> {
    let config = SieveConfig::new(n)
        .with_segment_width(segment_width)
        .with_workers(worker_count);
    compute_primes_with(&config, &NoProgress)
}

/// Same as [`compute_primes`], reporting each phase to `observer`.
pub fn compute_primes_with(
    config: &SieveConfig,
    observer: &dyn ProgressObserver,
) -> Result<Vec<u64>> {
    config.validate()?;

    if config.limit < 2 {
        return Ok(vec![]);
    }

    let base = BasePrimes::for_limit(config.limit);
    debug!(limit = config.limit, base_primes = base.len(), "base sieve finished");
    observer.base_sieve_done(base.len());

    let plan = SegmentPlan::new(config.limit, config.segment_width)?;
    debug!(
        segments = plan.len(),
        width = config.segment_width,
        workers = config.workers,
        "segment plan ready"
    );

    WorkerPool::new(config.workers).run(plan, &base, observer)
}
