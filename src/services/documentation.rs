//! Documentation Service Configuration Plumbing
//!
//! Output-side counterpart of [`LlmService`](super::LlmService): resolves
//! where and how generated documentation is written. Rendering itself is
//! out of scope; this service exists so output settings survive context
//! propagation and live config swaps the same way the LLM settings do.

use std::sync::Arc;

use tracing::debug;

use crate::config::PipelineConfig;
use crate::context;
use crate::registry::{AnySlot, Service, SharedSlot};

/// Configuration holder for documentation output
pub struct DocumentationService {
    /// Cached reference to the shared configuration aggregate; repaired in
    /// place by a live swap
    config: SharedSlot<PipelineConfig>,
}

impl DocumentationService {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            config: SharedSlot::new("config", config),
        }
    }

    /// The configuration this service acts under: scoped context first,
    /// then the cached shared reference, then the built-in default.
    pub fn effective_config(&self) -> Arc<PipelineConfig> {
        if let Some(config) = context::current() {
            return config;
        }
        if let Some(config) = self.config.load() {
            debug!("Scoped config absent - using cached service config");
            return config;
        }
        debug!("No config available to DocumentationService - using defaults");
        Arc::new(PipelineConfig::default())
    }

    /// Currently cached configuration reference, if any
    pub fn cached_config(&self) -> Option<Arc<PipelineConfig>> {
        self.config.load()
    }

    /// Directory documentation is written into, per the effective config
    pub fn output_directory(&self) -> String {
        self.effective_config().output.output_directory.clone()
    }

    /// Whether diagram generation is enabled in any form
    pub fn diagrams_enabled(&self) -> bool {
        let config = self.effective_config();
        config.output.generate_mermaid || config.output.generate_plantuml
    }
}

impl Service for DocumentationService {
    fn slots(&self) -> Vec<&dyn AnySlot> {
        vec![&self.config]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_directory_tracks_scoped_context() {
        context::clear();
        let service = DocumentationService::new(Arc::new(PipelineConfig::default()));
        assert_eq!(service.output_directory(), "docs");

        let mut overridden = PipelineConfig::default();
        overridden.output.output_directory = "site".to_string();
        let dir = context::scoped(Arc::new(overridden), || service.output_directory());
        assert_eq!(dir, "site");

        // Scoped override gone, cached reference resolves again
        assert_eq!(service.output_directory(), "docs");
    }

    #[test]
    fn test_diagrams_disabled_by_default() {
        context::clear();
        let service = DocumentationService::new(Arc::new(PipelineConfig::default()));
        assert!(!service.diagrams_enabled());
    }

    #[test]
    fn test_diagrams_enabled_via_config() {
        context::clear();
        let mut config = PipelineConfig::default();
        config.output.generate_mermaid = true;
        let service = DocumentationService::new(Arc::new(config));
        assert!(service.diagrams_enabled());
    }
}
