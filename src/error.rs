//! Error types for the parallel sieve

use thiserror::Error;

/// Result type alias for sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Errors reported by `compute_primes` and friends
#[derive(Debug, Error)]
pub enum SieveError {
    /// Segment width or worker count rejected before any work is dispatched
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The result channel closed before every planned segment reported
    #[error("Incomplete aggregation: expected {expected} segment results, received {received}")]
    IncompleteAggregation { expected: usize, received: usize },

    /// The same segment reported twice
    #[error("Segment {index} reported more than once")]
    DuplicateSegment { index: usize },

    /// A result arrived for a segment that is not part of the plan
    #[error("Segment {index} is outside the plan of {expected} segments")]
    UnknownSegment { index: usize, expected: usize },

    /// A worker thread could not be started
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A worker thread panicked while sieving
    #[error("Worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}
