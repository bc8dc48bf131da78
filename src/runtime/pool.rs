//! Bounded Worker Pool
//!
//! OS-thread worker pool with a bounded job queue, named workers, and a
//! per-job panic boundary so one failing task never takes a worker down.
//!
//! ## Saturation
//!
//! When the queue is full the configured [`SaturationPolicy`] decides:
//! `CallerRuns` executes the job on the submitting thread (never silently
//! drops), `Reject` hands the job back to the submitter so a fallback
//! runner can take it.

use std::fmt;
use std::sync::LazyLock;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::{error, warn};

use crate::constants::executor as executor_constants;

/// A unit of work submitted for asynchronous execution
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Why a job was handed back to the submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The bounded queue was full
    QueueFull,
    /// The pool has shut down and accepts no further work
    Terminated,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "queue full"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// A rejected submission. Carries the job back so the same unit of work can
/// be resubmitted elsewhere.
pub struct RejectedJob {
    pub job: Job,
    pub reason: RejectReason,
}

impl fmt::Debug for RejectedJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RejectedJob")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

/// A task runner that accepts jobs for asynchronous execution
pub trait TaskRunner: Send + Sync {
    /// Submit a job. On rejection the job is returned to the caller.
    fn submit(&self, job: Job) -> Result<(), RejectedJob>;
}

/// Policy applied when the queue cannot accept a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaturationPolicy {
    /// Run the job on the submitting thread
    CallerRuns,
    /// Hand the job back to the submitter
    Reject,
}

// =============================================================================
// Worker Pool
// =============================================================================

/// Bounded pool of named OS worker threads
pub struct WorkerPool {
    name: String,
    sender: Sender<Job>,
    policy: SaturationPolicy,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Create a pool with the default queue capacity and caller-runs
    /// saturation. Thread counts below 1 are clamped, not rejected.
    pub fn new(threads: usize, name_prefix: &str) -> Self {
        Self::with_settings(
            threads,
            name_prefix,
            executor_constants::MAX_QUEUE_SIZE,
            SaturationPolicy::CallerRuns,
        )
    }

    /// Create a pool with explicit queue capacity and saturation policy.
    pub fn with_settings(
        threads: usize,
        name_prefix: &str,
        queue_capacity: usize,
        policy: SaturationPolicy,
    ) -> Self {
        let threads = if threads == 0 {
            warn!(
                "Worker pool '{}' requested 0 threads - clamping to 1",
                name_prefix
            );
            1
        } else {
            threads
        };

        let (sender, receiver) = bounded::<Job>(queue_capacity.max(1));

        let workers = (0..threads)
            .filter_map(|i| {
                let receiver: Receiver<Job> = receiver.clone();
                let worker_name = format!("{}-{}", name_prefix, i + 1);
                let pool_name = name_prefix.to_string();
                thread::Builder::new()
                    .name(worker_name)
                    .spawn(move || {
                        while let Ok(job) = receiver.recv() {
                            run_job(&pool_name, job);
                        }
                    })
                    .inspect_err(|e| {
                        error!(
                            "Failed to spawn worker {} of pool '{}': {}",
                            i + 1,
                            name_prefix,
                            e
                        );
                    })
                    .ok()
            })
            .collect();

        Self {
            name: name_prefix.to_string(),
            sender,
            policy,
            workers,
        }
    }

    /// Pool name, used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the queue and wait for workers to drain and exit.
    pub fn shutdown(self) {
        drop(self.sender);
        for handle in self.workers {
            if handle.join().is_err() {
                error!("Worker thread of pool '{}' exited abnormally", self.name);
            }
        }
    }
}

impl TaskRunner for WorkerPool {
    fn submit(&self, job: Job) -> Result<(), RejectedJob> {
        match self.sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => match self.policy {
                SaturationPolicy::CallerRuns => {
                    warn!(
                        "Task rejected from pool '{}' - running in caller thread",
                        self.name
                    );
                    run_job(&self.name, job);
                    Ok(())
                }
                SaturationPolicy::Reject => Err(RejectedJob {
                    job,
                    reason: RejectReason::QueueFull,
                }),
            },
            Err(TrySendError::Disconnected(job)) => match self.policy {
                SaturationPolicy::CallerRuns => {
                    warn!(
                        "Pool '{}' is terminated - running task in caller thread",
                        self.name
                    );
                    run_job(&self.name, job);
                    Ok(())
                }
                SaturationPolicy::Reject => Err(RejectedJob {
                    job,
                    reason: RejectReason::Terminated,
                }),
            },
        }
    }
}

/// Run one job inside a panic boundary. A panicking job is logged and
/// absorbed so the worker thread survives for the next job.
fn run_job(pool_name: &str, job: Job) {
    if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "Uncaught panic in worker of pool '{}': {}",
            pool_name, message
        );
    }
}

// =============================================================================
// Shared Fallback Pool
// =============================================================================

static SHARED_POOL: LazyLock<WorkerPool> = LazyLock::new(|| {
    let threads = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(executor_constants::DEFAULT_THREAD_COUNT);
    WorkerPool::new(threads, executor_constants::SHARED_POOL_PREFIX)
});

/// Process-wide default runner, used when an executor is constructed without
/// a delegate and as the fallback when a delegate rejects work.
pub fn shared_pool() -> &'static WorkerPool {
    &SHARED_POOL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    #[test]
    fn test_pool_runs_jobs() {
        let pool = WorkerPool::new(2, "pool-test");
        let (tx, rx) = mpsc::channel();

        for i in 0..4 {
            let tx = tx.clone();
            pool.submit(Box::new(move || tx.send(i).unwrap())).unwrap();
        }

        let mut seen: Vec<i32> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        pool.shutdown();
    }

    #[test]
    fn test_zero_threads_clamped() {
        let pool = WorkerPool::new(0, "clamp-test");
        let (tx, rx) = mpsc::channel();
        pool.submit(Box::new(move || tx.send(()).unwrap())).unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        pool.shutdown();
    }

    #[test]
    fn test_worker_survives_panicking_job() {
        let pool = WorkerPool::new(1, "panic-test");
        let (tx, rx) = mpsc::channel();

        pool.submit(Box::new(|| panic!("task blew up"))).unwrap();
        pool.submit(Box::new(move || tx.send(()).unwrap())).unwrap();

        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        pool.shutdown();
    }

    #[test]
    fn test_caller_runs_when_saturated() {
        let pool = WorkerPool::with_settings(1, "saturate-test", 1, SaturationPolicy::CallerRuns);
        let gate = Arc::new(Barrier::new(2));
        let counter = Arc::new(AtomicUsize::new(0));

        // Occupy the single worker until we release the barrier
        let worker_gate = gate.clone();
        let (started_tx, started_rx) = mpsc::channel();
        pool.submit(Box::new(move || {
            started_tx.send(()).unwrap();
            worker_gate.wait();
        }))
        .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // Fill the single queue slot
        let queued = counter.clone();
        pool.submit(Box::new(move || {
            queued.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        // Queue and worker are both busy: this must run on the caller thread
        let caller_thread = thread::current().id();
        let (tx, rx) = mpsc::channel();
        pool.submit(Box::new(move || {
            tx.send(thread::current().id()).unwrap();
        }))
        .unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), caller_thread);

        gate.wait();
        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reject_policy_returns_job() {
        let pool = WorkerPool::with_settings(1, "reject-test", 1, SaturationPolicy::Reject);
        let gate = Arc::new(Barrier::new(2));

        let worker_gate = gate.clone();
        let (started_tx, started_rx) = mpsc::channel();
        pool.submit(Box::new(move || {
            started_tx.send(()).unwrap();
            worker_gate.wait();
        }))
        .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        pool.submit(Box::new(|| {})).unwrap();

        let rejected = pool.submit(Box::new(|| {})).unwrap_err();
        assert_eq!(rejected.reason, RejectReason::QueueFull);

        // The returned job is still runnable
        (rejected.job)();

        gate.wait();
        pool.shutdown();
    }

    #[test]
    fn test_shared_pool_accepts_work() {
        let (tx, rx) = mpsc::channel();
        shared_pool()
            .submit(Box::new(move || tx.send(()).unwrap()))
            .unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
}
