//! Context-Propagating Task Decorator
//!
//! Transforms a unit of work into an equivalent unit that carries the
//! caller's scoped configuration, for frameworks that own submission
//! themselves (a pooling hook, a callback registry) and only let the
//! integration wrap the task.
//!
//! Unlike [`PropagatingExecutor`](super::PropagatingExecutor), nothing is
//! submitted here: the snapshot is captured at decoration time — not at the
//! eventual run time — so a framework may decorate once and run later, on a
//! different thread from where decoration happened. The decorated task
//! satisfies the same install-then-guaranteed-clear contract.

use tracing::{info, warn};

use crate::context;

use super::pool::Job;

const ORIGIN: &str = "decorator";

/// Decorate a job with scoped-configuration propagation.
///
/// The returned job installs the configuration captured from the calling
/// thread, runs the original work inside a panic boundary that logs and
/// absorbs, and clears the worker's context afterwards unconditionally.
pub fn decorate(work: Job) -> Job {
    let snapshot = context::snapshot();

    match &snapshot {
        Some(snap) => info!(
            "Captured scoped config from caller thread with {} models (explicitly set: {})",
            snap.config.model_count(),
            snap.explicitly_set
        ),
        None => warn!("No scoped config available in caller thread - task will observe absence"),
    }

    Box::new(move || {
        context::run_propagated(ORIGIN, snapshot, work);
    })
}

/// Convenience wrapper for decorating a closure directly.
pub fn decorate_fn<F>(work: F) -> Job
where
    F: FnOnce() + Send + 'static,
{
    decorate(Box::new(work))
}
