//! The process-wide registry and free functions delegating to it.
//!
//! The registry behind these functions is created on first use, from whichever
//! thread gets there first, and lives for the rest of the process.
//!
//! # Examples
//!
//! ```
//! use capability_registry::{get, provide};
//! use std::sync::Arc;
//!
//! provide(42i32);
//!
//! let num: Arc<i32> = get().expect("Failed to get i32");
//! assert_eq!(*num, 42);
//! ```

use std::sync::{Arc, LazyLock};

use crate::{Dependency, Registry, RegistryError, RegistryEvent};

/// Global thread-safe registry.
///
/// `LazyLock` makes sure exactly one `Registry` is built even under concurrent
/// first access.
static GLOBAL_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Returns the process-wide registry.
///
/// Useful for handing the registry to code that takes a `&Registry`.
pub fn global() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// Stores a value of type `T` in the global registry.
///
/// # Examples
///
/// ```
/// use capability_registry::{get, provide};
/// use std::sync::Arc;
///
/// provide("Hello".to_string());
///
/// let s: Arc<String> = get().expect("Failed to get String");
/// assert_eq!(&*s, "Hello");
/// ```
pub fn provide<T: Send + Sync + 'static>(value: T) {
    GLOBAL_REGISTRY.provide(value);
}

/// Stores an `Arc<T>` in the global registry, keyed on `T`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use capability_registry::{get, provide_arc};
///
/// let value = Arc::new(String::from("shared"));
/// provide_arc(value.clone());
///
/// let retrieved: Arc<String> = get().expect("Failed to get value");
/// assert!(Arc::ptr_eq(&value, &retrieved));
/// ```
pub fn provide_arc<T: Send + Sync + 'static>(value: Arc<T>) {
    GLOBAL_REGISTRY.provide_arc(value);
}

/// Stores a boxed value in the global registry, keyed on `T`.
pub fn provide_boxed<T: Send + Sync + 'static>(value: Box<T>) {
    GLOBAL_REGISTRY.provide_boxed(value);
}

/// Stores a value with its interface bindings in the global registry.
pub fn provide_dependency<T: Send + Sync + 'static>(dependency: Dependency<T>) {
    GLOBAL_REGISTRY.provide_dependency(dependency);
}

/// Retrieves a value of type `T` from the global registry.
///
/// # Errors
///
/// [`RegistryError::NotFound`] if no `T` was provided.
pub fn get<T: Send + Sync + 'static>() -> Result<Arc<T>, RegistryError> {
    GLOBAL_REGISTRY.get()
}

/// Retrieves a clone of the value stored for `T` in the global registry.
///
/// # Errors
///
/// [`RegistryError::NotFound`] if no `T` was provided.
pub fn get_cloned<T: Send + Sync + Clone + 'static>() -> Result<T, RegistryError> {
    GLOBAL_REGISTRY.get_cloned()
}

/// Resolves a value from the global registry through an interface.
///
/// # Errors
///
/// See [`Registry::get_interface`].
pub fn get_interface<I: ?Sized + Send + Sync + 'static>() -> Result<Arc<I>, RegistryError> {
    GLOBAL_REGISTRY.get_interface()
}

/// Checks if a value of type `T` is stored in the global registry.
pub fn contains<T: Send + Sync + 'static>() -> bool {
    GLOBAL_REGISTRY.contains::<T>()
}

pub fn contains_interface<I: ?Sized + 'static>() -> bool {
    GLOBAL_REGISTRY.contains_interface::<I>()
}

/// Empties the global registry. Intended for test isolation.
pub fn reset() {
    GLOBAL_REGISTRY.reset();
}

/// Sets a tracing callback on the global registry.
///
/// # Example
/// ```rust
/// use capability_registry::{clear_trace_callback, set_trace_callback};
///
/// set_trace_callback(|event| println!("[registry-trace] {}", event));
/// clear_trace_callback();
/// ```
pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
    GLOBAL_REGISTRY.set_trace_callback(callback);
}

/// Clears the tracing callback of the global registry.
pub fn clear_trace_callback() {
    GLOBAL_REGISTRY.clear_trace_callback();
}
