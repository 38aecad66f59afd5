//! Property system for Horizon Collapse.
//!
//! Reactive properties with change detection, and lazily computed bindings.
//! A collapse item keeps its last observed expansion in a [`Property`] so a
//! change notification can be turned into an `(old, new)` pair, and caches
//! its identity in a [`Binding`] that is invalidated when group membership
//! changes.
//!
//! # Example
//!
//! ```
//! use horizon_collapse_core::Property;
//!
//! let expanded = Property::new(false);
//! assert_eq!(expanded.replace(true), Some(false));
//! assert_eq!(expanded.replace(true), None);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

/// A reactive property that tracks changes.
///
/// `Property<T>` wraps a value and provides change detection. [`replace`]
/// compares the new value with the current one and hands back the old value
/// only when it actually changed.
///
/// [`replace`]: Property::replace
///
/// # Thread Safety
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// when `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning the old value if it changed.
    ///
    /// The comparison and the write happen under one lock, so two racing
    /// callers never both observe the same transition.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

/// A computed property that derives its value from a computation.
///
/// `Binding<T>` caches its computed value and only recalculates when
/// explicitly invalidated.
///
/// # Example
///
/// ```
/// use horizon_collapse_core::Binding;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let position = Arc::new(AtomicUsize::new(2));
/// let source = position.clone();
/// let index = Binding::new(move || source.load(Ordering::SeqCst));
///
/// assert_eq!(index.get(), 2);
/// position.store(1, Ordering::SeqCst);
/// assert_eq!(index.get(), 2);
/// index.invalidate();
/// assert_eq!(index.get(), 1);
/// ```
pub struct Binding<T> {
    /// The computation function.
    compute: Box<dyn Fn() -> T + Send + Sync>,
    /// Cached value.
    cached: RwLock<Option<T>>,
    /// Whether the cache needs refreshing.
    dirty: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> Binding<T> {
    /// Create a new binding with a computation function.
    ///
    /// The function will be called lazily when `get()` is first called,
    /// and again after each `invalidate()` call.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            compute: Box::new(compute),
            cached: RwLock::new(None),
            dirty: AtomicBool::new(true),
        }
    }

    /// Get the current value, computing it if necessary.
    pub fn get(&self) -> T {
        if !self.dirty.load(Ordering::Acquire) {
            if let Some(value) = self.cached.read().as_ref() {
                return value.clone();
            }
        }

        // The lock is not held while computing; the computation may call
        // back into collaborators that read other bindings.
        let value = (self.compute)();
        *self.cached.write() = Some(value.clone());
        self.dirty.store(false, Ordering::Release);
        value
    }

    /// Mark the binding as dirty, causing recalculation on next `get()`.
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("dirty", &self.dirty.load(Ordering::Acquire))
            .field("cached", &*self.cached.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_property_replace() {
        let prop = Property::new("hello".to_string());

        assert!(prop.replace("hello".to_string()).is_none());

        let old = prop.replace("world".to_string());
        assert_eq!(old, Some("hello".to_string()));
        assert_eq!(prop.get(), "world");
    }

    #[test]
    fn test_binding_lazy_evaluation() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let binding = Binding::new(move || {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
            42
        });

        assert_eq!(call_count.load(Ordering::SeqCst), 0);

        assert_eq!(binding.get(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        // Second access uses cache
        assert_eq!(binding.get(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);

        binding.invalidate();
        assert_eq!(binding.get(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_binding_recomputes_after_invalidate() {
        let value = Arc::new(Property::new(1));
        let value_clone = value.clone();

        let binding = Binding::new(move || value_clone.get() + 10);

        assert_eq!(binding.get(), 11);

        value.replace(5);
        assert_eq!(binding.get(), 11);
        binding.invalidate();
        assert_eq!(binding.get(), 15);
    }
}
