//! Long-Lived Pipeline Services
//!
//! Thin configuration holders for the two long-lived consumers of the
//! pipeline configuration. They declare their cached references as slots
//! so a live swap can repair them, and resolve their effective
//! configuration through the scoped context first so propagated overrides
//! win over construction-time state.

mod documentation;
mod llm;

pub use documentation::DocumentationService;
pub use llm::LlmService;
