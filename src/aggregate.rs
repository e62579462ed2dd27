use crossbeam_channel::Receiver;
use tracing::error;

use crate::error::{Result, SieveError};
use crate::progress::ProgressObserver;
use crate::segment::SegmentResult;

/// Merges per-segment results into the final prime list.
///
/// Completion is count based: exactly `expected` results, one per planned
/// segment. A result channel that closes early is fatal, as is a segment
/// reported twice.
#[derive(Debug)]
pub struct Aggregator {
    expected: usize,
    seen: Vec<bool>,
}

impl Aggregator {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            seen: vec![false; expected],
        }
    }

    /// Block until every expected result arrived, then sort once.
    ///
    /// Results are concatenated in arrival order, which is arbitrary under
    /// concurrency; the terminal sort is what orders the list.
    pub fn collect(
        mut self,
        results: &Receiver<SegmentResult>,
        observer: &dyn ProgressObserver,
    ) -> Result<Vec<u64>> {
        let mut primes = Vec::new();
        let mut received = 0;

        while received < self.expected {
            let result = match results.recv() {
                Ok(result) => result,
                Err(_) => {
                    error!(
                        expected = self.expected,
                        received, "result channel closed before every segment reported"
                    );
                    return Err(SieveError::IncompleteAggregation {
                        expected: self.expected,
                        received,
                    });
                }
            };

            self.record(result.segment.index)?;
            received += 1;
            observer.segment_collected(received, self.expected);

            if primes.is_empty() {
                primes = result.primes;
            } else {
                primes.extend_from_slice(&result.primes);
            }
        }

        primes.sort_unstable();
        observer.segments_collected(received);
        Ok(primes)
    }

    fn record(&mut self, index: usize) -> Result<()> {
        match self.seen.get_mut(index) {
            Some(true) => Err(SieveError::DuplicateSegment { index }),
            Some(slot) => {
                *slot = true;
                Ok(())
            }
            None => Err(SieveError::UnknownSegment {
                index,
                expected: self.expected,
            }),
        }
    }
}
