//! Service Registry
//!
//! A name-to-instance mapping of long-lived services, with the narrow
//! surface the hot-swap machinery needs from whatever container actually
//! owns the objects: lookup, enumeration, and singleton replacement.
//!
//! [`ServiceRegistry`] is the built-in DashMap-backed implementation and
//! supports race-free atomic replacement. A container that cannot replace
//! atomically still works through the [`SingletonRegistry`] trait; swaps
//! against it take the weaker fallback path (see [`hotswap`]).

pub mod hotswap;
pub mod slot;

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::config::PipelineConfig;

pub use hotswap::{SkipReason, SwapOutcome, override_singleton};
pub use slot::{AnySlot, AnyValue, SharedSlot};

/// A live object that can be held by the registry.
///
/// Services that cache references to other bindings declare them via
/// [`slots`](Service::slots) so a swap can repair them; the default is no
/// dependent fields.
pub trait Service: Any + Send + Sync {
    /// Dependent fields holding cached references to other bindings
    fn slots(&self) -> Vec<&dyn AnySlot> {
        Vec::new()
    }
}

/// The configuration aggregate itself is a registrable value with no
/// dependent fields of its own.
impl Service for PipelineConfig {}

/// Binding scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One shared instance; replacement must be visible everywhere
    Singleton,
    /// Per-lookup instances; replacement is meaningless
    Prototype,
}

/// The registry surface the swap machinery operates against
pub trait SingletonRegistry: Send + Sync {
    /// Look up the live instance bound to `name`.
    fn lookup(&self, name: &str) -> Option<Arc<dyn Service>>;

    /// All known binding names.
    fn names(&self) -> Vec<String>;

    /// Whether `name` is bound with singleton scope.
    fn is_singleton(&self, name: &str) -> bool;

    /// Atomically replace the singleton bound to `name`.
    ///
    /// Returns `false` when the registry cannot do this atomically (or the
    /// binding is missing); the caller then falls back to [`rebind`]
    /// followed by a dependent-field walk.
    ///
    /// [`rebind`]: SingletonRegistry::rebind
    fn atomic_replace(&self, name: &str, value: Arc<dyn Service>) -> bool;

    /// Non-atomic best-effort rebind: remove the old binding and register
    /// the new value under the same name. Concurrent lookups may observe
    /// the gap.
    fn rebind(&self, name: &str, value: Arc<dyn Service>);

    /// Visit every singleton-scoped binding.
    fn for_each_singleton(&self, visitor: &mut dyn FnMut(&str, &Arc<dyn Service>));
}

// =============================================================================
// DashMap-backed Implementation
// =============================================================================

struct Binding {
    instance: Arc<dyn Service>,
    scope: Scope,
}

/// Built-in registry with atomic singleton replacement
#[derive(Default)]
pub struct ServiceRegistry {
    bindings: DashMap<String, Binding>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton-scoped instance under `name`.
    pub fn register(&self, name: impl Into<String>, instance: Arc<dyn Service>) {
        self.register_with_scope(name, instance, Scope::Singleton);
    }

    /// Register an instance with an explicit scope.
    pub fn register_with_scope(
        &self,
        name: impl Into<String>,
        instance: Arc<dyn Service>,
        scope: Scope,
    ) {
        let name = name.into();
        debug!("Registering binding '{}' ({:?})", name, scope);
        self.bindings.insert(name, Binding { instance, scope });
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Typed lookup convenience: the bound instance downcast to `T`.
    pub fn lookup_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let instance = self.lookup(name)?;
        let any: AnyValue = instance;
        any.downcast::<T>().ok()
    }
}

impl SingletonRegistry for ServiceRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.bindings.get(name).map(|b| b.instance.clone())
    }

    fn names(&self) -> Vec<String> {
        self.bindings.iter().map(|e| e.key().clone()).collect()
    }

    fn is_singleton(&self, name: &str) -> bool {
        self.bindings
            .get(name)
            .is_some_and(|b| b.scope == Scope::Singleton)
    }

    fn atomic_replace(&self, name: &str, value: Arc<dyn Service>) -> bool {
        match self.bindings.get_mut(name) {
            Some(mut binding) => {
                binding.instance = value;
                true
            }
            None => false,
        }
    }

    fn rebind(&self, name: &str, value: Arc<dyn Service>) {
        let scope = self
            .bindings
            .remove(name)
            .map(|(_, b)| b.scope)
            .unwrap_or(Scope::Singleton);
        self.bindings.insert(
            name.to_string(),
            Binding {
                instance: value,
                scope,
            },
        );
    }

    fn for_each_singleton(&self, visitor: &mut dyn FnMut(&str, &Arc<dyn Service>)) {
        for entry in self.bindings.iter() {
            if entry.value().scope == Scope::Singleton {
                visitor(entry.key(), &entry.value().instance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = ServiceRegistry::new();
        let config = Arc::new(PipelineConfig::default());
        registry.register("pipeline_config", config.clone());

        assert!(registry.contains("pipeline_config"));
        assert!(registry.is_singleton("pipeline_config"));
        let found = registry.lookup_as::<PipelineConfig>("pipeline_config").unwrap();
        assert!(Arc::ptr_eq(&found, &config));
    }

    #[test]
    fn test_prototype_scope_reported() {
        let registry = ServiceRegistry::new();
        registry.register_with_scope(
            "scratch",
            Arc::new(PipelineConfig::default()),
            Scope::Prototype,
        );
        assert!(!registry.is_singleton("scratch"));
    }

    #[test]
    fn test_atomic_replace_swaps_identity() {
        let registry = ServiceRegistry::new();
        let old = Arc::new(PipelineConfig::default());
        let new = Arc::new(PipelineConfig::default());
        registry.register("pipeline_config", old);

        assert!(registry.atomic_replace("pipeline_config", new.clone()));
        let found = registry.lookup_as::<PipelineConfig>("pipeline_config").unwrap();
        assert!(Arc::ptr_eq(&found, &new));
    }

    #[test]
    fn test_atomic_replace_unknown_name() {
        let registry = ServiceRegistry::new();
        assert!(!registry.atomic_replace("ghost", Arc::new(PipelineConfig::default())));
    }

    #[test]
    fn test_for_each_singleton_skips_prototypes() {
        let registry = ServiceRegistry::new();
        registry.register("a", Arc::new(PipelineConfig::default()));
        registry.register_with_scope(
            "b",
            Arc::new(PipelineConfig::default()),
            Scope::Prototype,
        );

        let mut seen = Vec::new();
        registry.for_each_singleton(&mut |name, _| seen.push(name.to_string()));
        assert_eq!(seen, vec!["a".to_string()]);
    }
}
