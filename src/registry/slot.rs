//! Rebindable Cached References
//!
//! A [`SharedSlot`] is a named, typed cell through which one service caches
//! a reference to another binding's value. Reads are lock-free
//! (`arc-swap`), so hot paths can resolve their configuration on every task
//! without contention; a swap repairs the cell in place and every holder of
//! the slot observes the new value on its next load.
//!
//! [`AnySlot`] is the type-erased view the swap machinery walks: it exposes
//! the field name, an accepted-type probe, and a guarded patch that only
//! overwrites a cell still holding the value being replaced.

use std::any::Any;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Type-erased value as stored in the registry
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// A named, typed cached reference to another binding's value
pub struct SharedSlot<T> {
    field: &'static str,
    cell: ArcSwapOption<T>,
}

impl<T> SharedSlot<T> {
    /// Create a slot holding an initial value.
    pub fn new(field: &'static str, initial: Arc<T>) -> Self {
        Self {
            field,
            cell: ArcSwapOption::from(Some(initial)),
        }
    }

    /// Create a slot with no value.
    pub fn empty(field: &'static str) -> Self {
        Self {
            field,
            cell: ArcSwapOption::empty(),
        }
    }

    /// Current value, if any. Lock-free.
    pub fn load(&self) -> Option<Arc<T>> {
        self.cell.load_full()
    }

    /// Replace the value unconditionally.
    pub fn store(&self, value: Arc<T>) {
        self.cell.store(Some(value));
    }

    /// Field name, matched against a replaced binding's name during a swap.
    pub fn field_name(&self) -> &'static str {
        self.field
    }
}

/// Type-erased slot view used by the swap walk
pub trait AnySlot: Send + Sync {
    /// Name of the field this slot represents
    fn field_name(&self) -> &'static str;

    /// Whether this slot's declared type can hold `value`
    fn accepts(&self, value: &AnyValue) -> bool;

    /// Overwrite the cell with `new` if it currently holds `old`.
    ///
    /// The guard skips cells that are empty (never initialized, nothing to
    /// repair) and cells already pointing elsewhere. The load and store are
    /// two steps with no lock spanning them: a concurrent writer between
    /// them wins the race. That window is an accepted property of the
    /// fallback swap path, not a bug to lock away.
    fn patch(&self, old: &AnyValue, new: &AnyValue) -> bool;
}

impl<T: Any + Send + Sync> AnySlot for SharedSlot<T> {
    fn field_name(&self) -> &'static str {
        self.field
    }

    fn accepts(&self, value: &AnyValue) -> bool {
        (**value).is::<T>()
    }

    fn patch(&self, old: &AnyValue, new: &AnyValue) -> bool {
        let Ok(new_typed) = new.clone().downcast::<T>() else {
            return false;
        };
        let Ok(old_typed) = old.clone().downcast::<T>() else {
            return false;
        };

        let Some(current) = self.cell.load_full() else {
            return false;
        };
        if !Arc::ptr_eq(&current, &old_typed) {
            return false;
        }

        self.cell.store(Some(new_typed));
        true
    }
}
