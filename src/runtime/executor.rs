//! Context-Propagating Executor
//!
//! Wraps a delegate [`TaskRunner`] so that every submitted task carries the
//! caller's scoped configuration onto the worker thread that runs it.
//!
//! ## Contract
//!
//! For each task: snapshot on submit, install on run, clear on completion.
//! The clear happens on every exit path, because pooled workers are reused
//! for unrelated, possibly configuration-free tasks; leaving stale context
//! installed would silently corrupt those tasks.
//!
//! ## Fallback
//!
//! A delegate that rejects a submission hands the wrapped job back; the
//! same unit is resubmitted to the process-wide shared pool. If that also
//! rejects, the task is logged and dropped — `execute` itself never fails.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::constants::executor as executor_constants;
use crate::context;

use super::pool::{self, Job, SaturationPolicy, TaskRunner, WorkerPool};

/// Executor that propagates the caller's scoped configuration to workers
pub struct PropagatingExecutor {
    delegate: Arc<dyn TaskRunner>,
    name: String,
}

impl PropagatingExecutor {
    /// Create an executor around a delegate runner. Construction never
    /// fails: a missing delegate falls back to the process-wide shared
    /// pool, a missing or empty name gets a placeholder.
    pub fn new(delegate: Option<Arc<dyn TaskRunner>>, name: Option<&str>) -> Self {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => executor_constants::UNNAMED_EXECUTOR.to_string(),
        };

        let delegate = match delegate {
            Some(runner) => runner,
            None => {
                warn!(
                    "Delegate runner was missing for '{}' - using shared pool as fallback",
                    name
                );
                Arc::new(SharedPoolRunner) as Arc<dyn TaskRunner>
            }
        };

        Self { delegate, name }
    }

    /// Executor name, used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute `work` on a worker thread with the caller's scoped
    /// configuration propagated to it.
    ///
    /// The snapshot is taken before submission returns; mutating or
    /// clearing the caller's context afterwards does not affect the task.
    pub fn execute<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let snapshot = context::snapshot();

        match &snapshot {
            Some(snap) => debug!(
                "[{}] Captured scoped config from caller thread with {} models",
                self.name,
                snap.config.model_count()
            ),
            None => warn!(
                "[{}] No scoped config available in caller thread - task will observe absence",
                self.name
            ),
        }

        let origin = self.name.clone();
        let wrapped: Job = Box::new(move || {
            context::run_propagated(&origin, snapshot, Box::new(work));
        });

        match self.delegate.submit(wrapped) {
            Ok(()) => {}
            Err(rejected) => {
                error!(
                    "[{}] Delegate runner rejected task ({}) - resubmitting to shared pool",
                    self.name, rejected.reason
                );
                if let Err(rejected) = pool::shared_pool().submit(rejected.job) {
                    error!(
                        "[{}] Shared pool also rejected task ({}) - dropping",
                        self.name, rejected.reason
                    );
                }
            }
        }
    }
}

/// Runner view of the process-wide shared pool
struct SharedPoolRunner;

impl TaskRunner for SharedPoolRunner {
    fn submit(&self, job: Job) -> Result<(), pool::RejectedJob> {
        pool::shared_pool().submit(job)
    }
}

/// Build a bounded worker pool and wrap it in a [`PropagatingExecutor`].
///
/// Thread counts below 1 are clamped to a safe minimum. The pool uses a
/// bounded queue with caller-runs saturation and workers that log rather
/// than die on a panicking task.
pub fn create_executor(threads: usize, name_prefix: &str) -> PropagatingExecutor {
    let pool = WorkerPool::with_settings(
        threads,
        name_prefix,
        executor_constants::MAX_QUEUE_SIZE,
        SaturationPolicy::CallerRuns,
    );
    PropagatingExecutor::new(Some(Arc::new(pool) as Arc<dyn TaskRunner>), Some(name_prefix))
}
