//! Live Singleton Replacement
//!
//! Replaces the value bound to a name at runtime and repairs cached
//! references so already-constructed consumers converge on the new value,
//! without restarting the process or breaking in-flight work.
//!
//! ## Paths
//!
//! - **Fast path**: the registry supports atomic replacement; the binding
//!   is swapped race-free with respect to concurrent lookups.
//! - **Fallback path**: the binding is rebound non-atomically and every
//!   other singleton's declared slots are walked, overwriting fields whose
//!   type accepts the new value or whose name equals the replaced binding,
//!   and which still hold the old value. There is no transaction spanning
//!   the capture of the old value and the walk; concurrent readers may
//!   observe a mix during the window. Accepted, best effort.
//!
//! Both paths finish by pushing a new [`PipelineConfig`] into the fixed set
//! of bindings known to cache one, covering dependents wired outside the
//! generic walk.
//!
//! The whole operation is best-effort: apart from argument misuse, failures
//! are logged and absorbed — a partial swap must never crash the host
//! process mid-analysis.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::constants::registry as registry_constants;
use crate::types::{DocuWeaveError, Result};

use super::slot::AnyValue;
use super::{Service, SingletonRegistry};

/// How a swap concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The binding was replaced
    Replaced {
        /// Whether the race-free fast path was taken
        atomic: bool,
        /// Dependent fields repaired across other singletons
        dependents_updated: usize,
    },
    /// Nothing was replaced
    Skipped(SkipReason),
}

/// Why a swap was a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No binding with that name exists
    UnknownBinding,
    /// The binding is not singleton-scoped
    NotSingleton,
    /// An unexpected failure was caught by the outer boundary
    InternalError,
}

/// Replace the singleton bound to `name` with `new_value` and repair
/// cached references to the old value.
///
/// An empty `name` is a programmer error and fails fast; every other
/// problem completes the call normally with the outcome observable here
/// and in the logs.
pub fn override_singleton(
    registry: &dyn SingletonRegistry,
    name: &str,
    new_value: Arc<dyn Service>,
) -> Result<SwapOutcome> {
    if name.trim().is_empty() {
        return Err(DocuWeaveError::InvalidArgument(
            "binding name cannot be empty".to_string(),
        ));
    }

    match catch_unwind(AssertUnwindSafe(|| do_override(registry, name, new_value))) {
        Ok(outcome) => Ok(outcome),
        Err(_) => {
            error!("Unexpected failure while overriding binding '{}'", name);
            Ok(SwapOutcome::Skipped(SkipReason::InternalError))
        }
    }
}

fn do_override(
    registry: &dyn SingletonRegistry,
    name: &str,
    new_value: Arc<dyn Service>,
) -> SwapOutcome {
    info!("Attempting to override binding: {}", name);

    let Some(old_value) = registry.lookup(name) else {
        error!("Binding with name '{}' not found", name);
        let names = registry.names();
        info!("Available bindings ({}): {}", names.len(), names.join(", "));
        return SwapOutcome::Skipped(SkipReason::UnknownBinding);
    };

    if !registry.is_singleton(name) {
        warn!("Binding '{}' is not a singleton. Will not override.", name);
        return SwapOutcome::Skipped(SkipReason::NotSingleton);
    }

    // Captured before replacement; the fallback walk only overwrites fields
    // still holding this exact value.
    let old_any: AnyValue = old_value;
    let new_any: AnyValue = new_value.clone();

    let atomic = registry.atomic_replace(name, new_value.clone());
    let mut dependents_updated = 0;

    if atomic {
        info!("Replaced binding '{}' via atomic fast path", name);
    } else {
        info!(
            "Atomic replacement unavailable for '{}' - rebinding and walking dependents",
            name
        );
        registry.rebind(name, new_value.clone());

        registry.for_each_singleton(&mut |binding_name, instance| {
            if binding_name == name {
                return;
            }
            dependents_updated += patch_instance(binding_name, instance, name, &old_any, &new_any);
        });
        info!("Updated {} dependent bindings", dependents_updated);
    }

    dependents_updated += repair_known_dependents(registry, name, &old_any, &new_any);

    // Verify the binding was actually replaced
    match registry.lookup(name) {
        Some(current) if same_instance(&current, &new_value) => {
            info!("Successfully replaced binding '{}' (identity verified)", name);
        }
        _ => {
            warn!("Replacement verification failed for '{}' - instances are not identical", name);
        }
    }

    SwapOutcome::Replaced {
        atomic,
        dependents_updated,
    }
}

/// Apply the field-patch rule to one instance's declared slots.
///
/// A slot is overwritten when its declared type accepts the new value or
/// its field name equals the replaced binding's name, and it still holds
/// the old value.
fn patch_instance(
    binding_name: &str,
    instance: &Arc<dyn Service>,
    replaced_name: &str,
    old: &AnyValue,
    new: &AnyValue,
) -> usize {
    let mut updated = 0;
    for slot in instance.slots() {
        let name_match = slot.field_name() == replaced_name;
        let type_match = slot.accepts(new);
        if (name_match || type_match) && slot.patch(old, new) {
            info!(
                "Updated field '{}' in binding '{}'",
                slot.field_name(),
                binding_name
            );
            updated += 1;
        }
    }
    updated
}

/// Push a replaced [`PipelineConfig`] into the bindings known to cache one,
/// even if the generic walk never discovered them.
///
/// [`PipelineConfig`]: crate::config::PipelineConfig
fn repair_known_dependents(
    registry: &dyn SingletonRegistry,
    replaced_name: &str,
    old: &AnyValue,
    new: &AnyValue,
) -> usize {
    if !(**new).is::<crate::config::PipelineConfig>() {
        return 0;
    }

    let mut updated = 0;
    for dependent in registry_constants::CONFIG_DEPENDENTS {
        let Some(instance) = registry.lookup(dependent) else {
            continue;
        };
        info!("Found {} binding - updating with new config", dependent);
        let patched = patch_instance(dependent, &instance, replaced_name, old, new);
        info!(
            "{} config update result: {}",
            dependent,
            if patched > 0 { "successful" } else { "no change" }
        );
        updated += patched;
    }
    updated
}

fn same_instance(a: &Arc<dyn Service>, b: &Arc<dyn Service>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
