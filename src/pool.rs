use std::thread::{self, Scope, ScopedJoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::debug;

use crate::aggregate::Aggregator;
use crate::base::BasePrimes;
use crate::error::{Result, SieveError};
use crate::progress::ProgressObserver;
use crate::segment::{Segment, SegmentPlan, SegmentResult, sieve_segment};

/// Fixed-size pool of sieve workers.
///
/// Workers pull segments from one shared queue (natural load balancing),
/// sieve them with their own bit-vector, and push results to one shared sink.
/// The queue and the sink are the only state the workers share besides the
/// read-only base primes.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    /// Sieve every segment of `plan` and return the merged, sorted primes.
    pub fn run(
        &self,
        plan: SegmentPlan,
        base: &BasePrimes,
        observer: &dyn ProgressObserver,
    ) -> Result<Vec<u64>> {
        let aggregator = Aggregator::new(plan.len());

        thread::scope(|scope| {
            let (task_tx, task_rx) = unbounded::<Segment>();
            let (result_tx, result_rx) = unbounded::<SegmentResult>();

            let workers = self.spawn(scope, &task_rx, &result_tx, base)?;

            // Workers hold their own clones; dropping ours lets a closed
            // result channel mean "every worker is gone".
            drop(result_tx);
            drop(task_rx);

            let mut dispatched = 0;
            for segment in plan {
                if task_tx.send(segment).is_err() {
                    break; // Every worker exited; the aggregator reports the shortfall
                }
                dispatched += 1;
            }
            // Closing the queue is the workers' exit signal once it drains
            drop(task_tx);
            observer.segments_dispatched(dispatched);

            let collected = aggregator.collect(&result_rx, observer);
            let processed = workers.join()?;
            debug!(processed, "all workers joined");
            collected
        })
    }

    fn spawn<'scope>(
        &self,
        scope: &'scope Scope<'scope, '_>,
        tasks: &Receiver<Segment>,
        results: &Sender<SegmentResult>,
        base: &BasePrimes,
    ) -> Result<Workers<'scope>> {
        let mut handles = Vec::with_capacity(self.workers);

        for worker_id in 0..self.workers {
            let tasks = tasks.clone();
            let results = results.clone();
            let base = base.clone();

            let handle = thread::Builder::new()
                .name(format!("sieve-worker-{worker_id}"))
                .spawn_scoped(scope, move || run_worker(worker_id, tasks, results, base))?;
            handles.push(handle);
        }

        Ok(Workers { handles })
    }
}

/// Handles of the running workers
struct Workers<'scope> {
    handles: Vec<ScopedJoinHandle<'scope, usize>>,
}

impl Workers<'_> {
    /// Wait for every worker; returns the total number of segments sieved
    fn join(self) -> Result<usize> {
        let mut processed = 0;
        let mut panicked = None;

        for (worker, handle) in self.handles.into_iter().enumerate() {
            match handle.join() {
                Ok(count) => processed += count,
                Err(_) => {
                    panicked.get_or_insert(worker);
                }
            }
        }

        match panicked {
            Some(worker) => Err(SieveError::WorkerPanicked { worker }),
            None => Ok(processed),
        }
    }
}

fn run_worker(
    worker_id: usize,
    tasks: Receiver<Segment>,
    results: Sender<SegmentResult>,
    base: BasePrimes,
) -> usize {
    debug!(worker_id, "worker started");
    let mut processed = 0;

    // Blocks on the queue; ends once it is drained and closed
    for segment in tasks.iter() {
        let result = sieve_segment(segment, &base);
        if results.send(result).is_err() {
            break; // Aggregator gone, stop this worker
        }
        processed += 1;
    }

    debug!(worker_id, processed, "worker finished");
    processed
}
