//! DocuWeave Runtime Core
//!
//! Runtime plumbing for AI-driven documentation generation: a mutable,
//! process-wide configuration must stay visible, consistently and without
//! races, to work running on shared worker pools, and must be swappable
//! while the pipeline is live.
//!
//! ## Core Features
//!
//! - **Scoped Context**: per-thread configuration cell with explicit vs.
//!   propagated tracking and stack-discipline overrides
//! - **Propagating Execution**: snapshot-on-submit executor and task
//!   decorator with an install-then-guaranteed-clear contract, so pooled
//!   workers never leak configuration between unrelated tasks
//! - **Live Config Swap**: replace a named singleton at runtime and repair
//!   every cached reference to it, atomically where the registry allows
//! - **Layered Configuration**: figment-based resolution across defaults,
//!   global and project files, and environment variables
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use docuweave::{PipelineConfig, context, runtime};
//!
//! let config = Arc::new(PipelineConfig::default());
//! context::set(config);
//!
//! let executor = runtime::create_executor(4, "doc-worker");
//! executor.execute(|| {
//!     // Observes the submitting thread's configuration
//!     let config = docuweave::context::current_or_default();
//!     let _ = config.model_count();
//! });
//! ```
//!
//! ## Modules
//!
//! - [`context`]: scoped per-thread configuration storage
//! - [`runtime`]: worker pools, propagating executor, task decorator
//! - [`registry`]: service registry and live singleton replacement
//! - [`config`]: configuration aggregate, loader, runtime application
//! - [`services`]: long-lived configuration consumers

pub mod config;
pub mod constants;
pub mod context;
pub mod registry;
pub mod runtime;
pub mod services;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{
    AnalysisSettings, ConfigLoader, LlmModelConfig, OutputSettings, PipelineConfig,
    apply_external_config,
};

// Error Types
pub use types::{DocuWeaveError, Result};

// =============================================================================
// Runtime Re-exports
// =============================================================================

pub use runtime::{
    Job, PropagatingExecutor, SaturationPolicy, TaskRunner, WorkerPool, create_executor, decorate,
    decorate_fn,
};

// =============================================================================
// Registry Re-exports
// =============================================================================

pub use registry::{
    AnySlot, Scope, Service, ServiceRegistry, SharedSlot, SingletonRegistry, SwapOutcome,
    override_singleton,
};

// =============================================================================
// Service Re-exports
// =============================================================================

pub use services::{DocumentationService, LlmService};
