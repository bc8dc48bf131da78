//! Context-Propagating Task Execution
//!
//! Asynchronous execution plumbing that carries the caller's scoped
//! configuration onto pooled worker threads:
//!
//! - [`WorkerPool`]: bounded pool of named OS threads with a per-job panic
//!   boundary and a configurable saturation policy
//! - [`PropagatingExecutor`]: snapshot-on-submit executor with a shared-pool
//!   fallback when the delegate rejects work
//! - [`decorate`]: task transform for frameworks that own submission

mod decorator;
mod executor;
mod pool;

pub use decorator::{decorate, decorate_fn};
pub use executor::{PropagatingExecutor, create_executor};
pub use pool::{
    Job, RejectReason, RejectedJob, SaturationPolicy, TaskRunner, WorkerPool, shared_pool,
};
