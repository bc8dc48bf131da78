//! Scoped Configuration Context
//!
//! Per-thread storage for the current [`PipelineConfig`]. Centralizes all
//! thread-local access so async plumbing can snapshot a caller's context and
//! reinstall it on a pooled worker (see [`crate::runtime`]).
//!
//! A thread's cell is in one of three states:
//! - **absent**: nothing was ever set or propagated here
//! - **explicit**: [`set`] ran on this exact thread
//! - **implicit**: a snapshot arrived via propagation from another thread
//!
//! Pooled workers are reused across unrelated tasks, so whoever installs a
//! value here owns clearing it afterwards; the wrappers in
//! [`crate::runtime`] guarantee that with a drop guard.

use std::cell::RefCell;
use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info};

use crate::config::PipelineConfig;

thread_local! {
    static CURRENT: RefCell<Option<Slot>> = const { RefCell::new(None) };
}

#[derive(Clone)]
struct Slot {
    config: Arc<PipelineConfig>,
    explicit: bool,
}

/// Point-in-time copy of a thread's context, taken at submission or
/// decoration time. Immune to later mutation of the submitter's context.
#[derive(Clone)]
pub struct ContextSnapshot {
    pub(crate) config: Arc<PipelineConfig>,
    pub(crate) explicitly_set: bool,
}

fn thread_name() -> String {
    thread::current().name().unwrap_or("unnamed").to_string()
}

/// Set the configuration as the current, explicit value for this thread.
pub fn set(config: Arc<PipelineConfig>) {
    debug!(
        "Setting scoped config in thread [{}] with {} models",
        thread_name(),
        config.model_count()
    );

    CURRENT.with(|cell| {
        *cell.borrow_mut() = Some(Slot {
            config,
            explicit: true,
        });
    });
}

/// Get the current configuration for this thread, if any.
pub fn current() -> Option<Arc<PipelineConfig>> {
    let config = CURRENT.with(|cell| cell.borrow().as_ref().map(|slot| slot.config.clone()));

    if config.is_none() {
        debug!(
            "Scoped config is not available in thread [{}]",
            thread_name()
        );
    }

    config
}

/// Get the current configuration for this thread, or the built-in default
/// aggregate if none was ever set or propagated here.
pub fn current_or_default() -> Arc<PipelineConfig> {
    current().unwrap_or_else(|| Arc::new(PipelineConfig::default()))
}

/// Whether the configuration was explicitly set on this exact thread,
/// as opposed to inherited via propagation.
pub fn is_explicitly_set() -> bool {
    CURRENT.with(|cell| cell.borrow().as_ref().is_some_and(|slot| slot.explicit))
}

/// Clear any configuration from this thread's context. Idempotent.
pub fn clear() {
    let was_explicit = CURRENT.with(|cell| {
        let previous = cell.borrow_mut().take();
        previous.map(|slot| slot.explicit)
    });

    debug!(
        "Clearing scoped config in thread [{}] (explicitly set: {:?})",
        thread_name(),
        was_explicit
    );
}

/// Run `body` with `config` installed as this thread's explicit context,
/// restoring the previous state on every exit path.
///
/// Nested calls compose: the innermost call restores to the value seen by
/// the next-outer call. If `body` panics, the previous context is restored
/// before the panic propagates to the caller.
pub fn scoped<R>(config: Arc<PipelineConfig>, body: impl FnOnce() -> R) -> R {
    struct RestoreGuard {
        previous: Option<Slot>,
    }

    impl Drop for RestoreGuard {
        fn drop(&mut self) {
            let previous = self.previous.take();
            match &previous {
                Some(_) => debug!(
                    "Restored previous scoped config in thread [{}]",
                    thread_name()
                ),
                None => debug!("Restored absent scoped config in thread [{}]", thread_name()),
            }
            CURRENT.with(|cell| *cell.borrow_mut() = previous);
        }
    }

    let previous = CURRENT.with(|cell| {
        cell.borrow_mut().replace(Slot {
            config,
            explicit: true,
        })
    });
    let _guard = RestoreGuard { previous };

    body()
}

/// Log the current thread's configuration status for diagnostics.
pub fn log_status() {
    CURRENT.with(|cell| match cell.borrow().as_ref() {
        Some(slot) => info!(
            "Thread [{}] has config with {} models (explicitly set: {})",
            thread_name(),
            slot.config.model_count(),
            slot.explicit
        ),
        None => info!("Thread [{}] has no config set", thread_name()),
    });
}

// =============================================================================
// Propagation Internals
// =============================================================================

/// Snapshot this thread's context for propagation to a worker.
pub(crate) fn snapshot() -> Option<ContextSnapshot> {
    CURRENT.with(|cell| {
        cell.borrow().as_ref().map(|slot| ContextSnapshot {
            config: slot.config.clone(),
            explicitly_set: slot.explicit,
        })
    })
}

/// Install a propagated snapshot on the current (worker) thread.
/// The value arrives implicit: it was inherited, not deliberately set here.
pub(crate) fn install_propagated(config: Arc<PipelineConfig>) {
    CURRENT.with(|cell| {
        *cell.borrow_mut() = Some(Slot {
            config,
            explicit: false,
        });
    });
}

/// Shared install-run-clear wrapper body used by the executor and the task
/// decorator. Errors raised by `work` are caught and logged here; one
/// failing task must not corrupt pool health or leak context.
pub(crate) fn run_propagated(
    origin: &str,
    snapshot: Option<ContextSnapshot>,
    work: Box<dyn FnOnce() + Send>,
) {
    // Clears the worker thread's context on every exit path, so a later,
    // unrelated task on the same pooled thread never observes stale
    // configuration.
    struct ClearGuard<'a> {
        origin: &'a str,
    }

    impl Drop for ClearGuard<'_> {
        fn drop(&mut self) {
            CURRENT.with(|cell| cell.borrow_mut().take());
            debug!(
                "[{}] Cleaned up scoped config in worker thread [{}]",
                self.origin,
                thread_name()
            );
        }
    }

    let _guard = ClearGuard { origin };

    if let Some(snap) = snapshot {
        let model_count = snap.config.model_count();
        install_propagated(snap.config);
        debug!(
            "[{}] Installed propagated config in worker thread with {} models (explicitly set at capture: {})",
            origin, model_count, snap.explicitly_set
        );
    }

    if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(work)) {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!("[{}] Error in task execution: {}", origin, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn config_with_max_tokens(max_tokens: u32) -> Arc<PipelineConfig> {
        let mut config = PipelineConfig::default();
        config.llm_models[0].max_tokens = max_tokens;
        Arc::new(config)
    }

    #[test]
    fn test_set_then_current() {
        clear();
        let config = config_with_max_tokens(111);
        set(config.clone());
        let seen = current().unwrap();
        assert!(Arc::ptr_eq(&config, &seen));
        assert!(is_explicitly_set());
        clear();
    }

    #[test]
    fn test_absent_by_default() {
        clear();
        assert!(current().is_none());
        assert!(!is_explicitly_set());
    }

    #[test]
    fn test_clear_is_idempotent() {
        clear();
        clear();
        assert!(current().is_none());
    }

    #[test]
    fn test_current_or_default_falls_back() {
        clear();
        let config = current_or_default();
        assert_eq!(config.model_count(), 1);
    }

    #[test]
    fn test_explicit_flag_requires_value() {
        clear();
        set(config_with_max_tokens(1));
        assert!(is_explicitly_set());
        assert!(current().is_some());
        clear();
        assert!(!is_explicitly_set());
    }

    #[test]
    fn test_propagated_install_is_implicit() {
        clear();
        install_propagated(config_with_max_tokens(7));
        assert!(current().is_some());
        assert!(!is_explicitly_set());
        clear();
    }

    #[test]
    fn test_scoped_restores_previous_value() {
        clear();
        let outer = config_with_max_tokens(1);
        let inner = config_with_max_tokens(2);
        set(outer.clone());

        scoped(inner.clone(), || {
            let seen = current().unwrap();
            assert!(Arc::ptr_eq(&inner, &seen));
        });

        let restored = current().unwrap();
        assert!(Arc::ptr_eq(&outer, &restored));
        assert!(is_explicitly_set());
        clear();
    }

    #[test]
    fn test_scoped_restores_absence() {
        clear();
        scoped(config_with_max_tokens(3), || {
            assert!(current().is_some());
        });
        assert!(current().is_none());
    }

    #[test]
    fn test_scoped_returns_body_value() {
        clear();
        let result = scoped(config_with_max_tokens(4), || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_scoped_restores_on_panic() {
        clear();
        let outer = config_with_max_tokens(5);
        set(outer.clone());

        let result = catch_unwind(AssertUnwindSafe(|| {
            scoped(config_with_max_tokens(6), || panic!("boom"));
        }));
        assert!(result.is_err());

        let restored = current().unwrap();
        assert!(Arc::ptr_eq(&outer, &restored));
        clear();
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        clear();
        let first = config_with_max_tokens(10);
        set(first.clone());
        let snap = snapshot().unwrap();

        // Mutating the thread's context after the snapshot must not affect it
        set(config_with_max_tokens(20));
        assert!(Arc::ptr_eq(&snap.config, &first));
        assert!(snap.explicitly_set);
        clear();
    }

    #[test]
    fn test_run_propagated_clears_after_panic() {
        clear();
        let snap = ContextSnapshot {
            config: config_with_max_tokens(9),
            explicitly_set: true,
        };
        run_propagated("test", Some(snap), Box::new(|| panic!("task failed")));
        assert!(current().is_none());
    }

    #[test]
    fn test_context_is_thread_isolated() {
        clear();
        set(config_with_max_tokens(33));

        let handle = thread::spawn(|| current().is_none());
        assert!(handle.join().unwrap());
        clear();
    }

    proptest! {
        /// Any nesting of scoped overrides restores the original value.
        #[test]
        fn prop_nested_scoped_restores(values in proptest::collection::vec(1u32..10_000, 1..8)) {
            clear();
            let original = config_with_max_tokens(0);
            set(original.clone());

            fn nest(values: &[u32]) {
                if let Some((first, rest)) = values.split_first() {
                    let config = {
                        let mut c = PipelineConfig::default();
                        c.llm_models[0].max_tokens = *first;
                        Arc::new(c)
                    };
                    scoped(config.clone(), || {
                        let seen = current().unwrap();
                        assert!(Arc::ptr_eq(&config, &seen));
                        nest(rest);
                        // Inner scopes restored our value before returning
                        let after = current().unwrap();
                        assert!(Arc::ptr_eq(&config, &after));
                    });
                }
            }

            nest(&values);

            let restored = current().unwrap();
            prop_assert!(Arc::ptr_eq(&original, &restored));
            clear();
        }
    }
}
