//! LLM Service Configuration Plumbing
//!
//! Holds the configuration and execution resources the LLM backend runs
//! with. The backend calls themselves (prompting, HTTP, response parsing)
//! live outside this crate; what belongs here is how the service resolves
//! its effective configuration across thread boundaries and survives a
//! live config swap.

use std::sync::Arc;

use tracing::debug;

use crate::config::PipelineConfig;
use crate::constants::executor as executor_constants;
use crate::context;
use crate::registry::{AnySlot, Service, SharedSlot};
use crate::runtime::{PropagatingExecutor, create_executor};

/// Configuration holder and work fan-out point for LLM-backed generation
pub struct LlmService {
    /// Cached reference to the shared configuration aggregate; repaired in
    /// place by a live swap
    config: SharedSlot<PipelineConfig>,
    /// Pool for parallel generation work, propagating the caller's context
    executor: PropagatingExecutor,
}

impl LlmService {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            config: SharedSlot::new("config", config),
            executor: create_executor(executor_constants::DEFAULT_THREAD_COUNT, "llm-worker"),
        }
    }

    /// The configuration this service acts under, resolved in order:
    /// the calling thread's scoped context, then the cached shared
    /// reference, then the built-in default aggregate.
    pub fn effective_config(&self) -> Arc<PipelineConfig> {
        if let Some(config) = context::current() {
            return config;
        }
        if let Some(config) = self.config.load() {
            debug!("Scoped config absent - using cached service config");
            return config;
        }
        debug!("No config available to LlmService - using defaults");
        Arc::new(PipelineConfig::default())
    }

    /// Currently cached configuration reference, if any
    pub fn cached_config(&self) -> Option<Arc<PipelineConfig>> {
        self.config.load()
    }

    /// Name of the first configured model, the one tried first
    pub fn primary_model(&self) -> Option<String> {
        self.effective_config()
            .llm_models
            .first()
            .map(|m| m.name.clone())
    }

    /// Executor for fanning out generation work with the caller's
    /// configuration propagated to the workers
    pub fn executor(&self) -> &PropagatingExecutor {
        &self.executor
    }
}

impl Service for LlmService {
    fn slots(&self) -> Vec<&dyn AnySlot> {
        vec![&self.config]
    }
}
