//! The registry object.
//!
//! A [`Registry`] stores at most one value per concrete type and resolves values
//! either by that type or by an interface declared when the value was provided.
//!
//! # Examples
//!
//! ```
//! use capability_registry::Registry;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! registry.provide("Hello, World!".to_string());
//!
//! let message: Arc<String> = registry.get().unwrap();
//! assert_eq!(&*message, "Hello, World!");
//! ```

use std::{
    any::Any,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use dashmap::{mapref::entry::Entry as Slot, DashMap};
use tracing::trace;

use crate::dependency::{Dependency, DependencyKey, InterfaceBinding};
use crate::{RegistryError, RegistryEvent, RegistryOptions, ResolutionPolicy};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It must be thread-safe because the registry itself is shared.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// A stored value with the interface views recorded at provide time.
struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    interfaces: Vec<InterfaceBinding>,
    sequence: u64,
}

/// Thread-safe store of provided dependencies.
///
/// Values are kept as `Arc<T>` under the key of `T`; a later provide of the same
/// type replaces the entry together with its interface bindings.
pub struct Registry {
    entries: DashMap<DependencyKey, Entry>,
    sequence: AtomicU64,
    options: RegistryOptions,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            entries: DashMap::new(),
            sequence: AtomicU64::new(0),
            options,
            trace: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// The callback will be invoked for every registry operation. It runs after
    /// the internal locks are released, so it may call back into the registry.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the trace lock is poisoned (due to a panic while holding the lock),
    /// this method recovers by extracting the inner value.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    ///
    /// Registered values are not affected.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: impl FnOnce() -> RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        if let Some(callback) = callback {
            callback(&event());
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Provide
    // -------------------------------------------------------------------------------------------------

    /// Stores `value` under the key of `T`, replacing any previous `T`.
    ///
    /// `T` is taken as is: `provide(Arc::new(x))` keys on `Arc<X>`. Use
    /// [`Registry::provide_arc`] or [`Registry::provide_boxed`] to store a
    /// pointer under the type it points to.
    ///
    /// ```
    /// use capability_registry::Registry;
    /// use std::sync::Arc;
    ///
    /// let registry = Registry::new();
    /// registry.provide(10i32);
    /// registry.provide(20i32);
    ///
    /// let num: Arc<i32> = registry.get().unwrap();
    /// assert_eq!(*num, 20);
    /// ```
    pub fn provide<T: Send + Sync + 'static>(&self, value: T) {
        self.provide_dependency(Dependency::new(value));
    }

    /// Stores an existing `Arc<T>` under the key of `T`.
    ///
    /// Lookups return clones of this very `Arc`, so pointer identity is preserved.
    pub fn provide_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) {
        self.provide_dependency(Dependency::from_arc(value));
    }

    /// Stores a boxed value under the key of `T`.
    pub fn provide_boxed<T: Send + Sync + 'static>(&self, value: Box<T>) {
        self.provide_dependency(Dependency::from_box(value));
    }

    /// Stores a value together with the interfaces declared on the builder.
    ///
    /// See also the [`provide!`](crate::provide) macro.
    pub fn provide_dependency<T: Send + Sync + 'static>(&self, dependency: Dependency<T>) {
        let key = dependency.key();
        let interfaces: Vec<&'static str> =
            dependency.interfaces().map(|k| k.type_name()).collect();

        trace!(
            target: "capability_registry",
            type_name = key.type_name(),
            interfaces = ?interfaces,
            "provide"
        );

        let (value, bindings) = dependency.into_parts();
        let mut entry = Entry {
            value,
            interfaces: bindings,
            sequence: 0,
        };

        // The sequence is taken under the shard lock so that the stored entry
        // always carries the newest number for its key.
        let _replaced = match self.entries.entry(key) {
            Slot::Occupied(mut slot) => {
                entry.sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
                Some(slot.insert(entry))
            }
            Slot::Vacant(slot) => {
                entry.sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
                slot.insert(entry);
                None
            }
        };
        // `_replaced` is dropped at the end of this call, after the shard lock is released.

        self.emit_event(|| RegistryEvent::Provide {
            type_name: key.type_name(),
            interfaces,
        });
    }

    // -------------------------------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------------------------------

    /// Retrieves the value stored for the concrete type `T`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no `T` was provided (or it was reset)
    /// - [`RegistryError::TypeMismatch`] if the stored value does not downcast to `T`
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        let key = DependencyKey::of::<T>();
        let stored = self.entries.get(&key).map(|entry| Arc::clone(&entry.value));

        let result = match stored {
            Some(value) => value
                .downcast::<T>()
                .map_err(|_| RegistryError::TypeMismatch {
                    type_name: key.type_name(),
                }),
            None => Err(RegistryError::NotFound {
                type_name: key.type_name(),
            }),
        };

        trace!(
            target: "capability_registry",
            type_name = key.type_name(),
            found = result.is_ok(),
            "get"
        );
        self.emit_event(|| RegistryEvent::Get {
            type_name: key.type_name(),
            found: result.is_ok(),
        });

        result
    }

    /// Retrieves a clone of the value stored for `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::get`].
    pub fn get_cloned<T: Send + Sync + Clone + 'static>(&self) -> Result<T, RegistryError> {
        let arc = self.get::<T>()?;
        Ok((*arc).clone())
    }

    /// Resolves a stored value through an interface it was provided with.
    ///
    /// Every entry is scanned. When several entries implement `I` the
    /// configured [`ResolutionPolicy`] decides: the latest provide wins, or the
    /// lookup fails as ambiguous.
    ///
    /// ```
    /// use capability_registry::{provide, Registry};
    /// use std::sync::Arc;
    ///
    /// trait Clock: Send + Sync {
    ///     fn now(&self) -> u64;
    /// }
    ///
    /// struct Fixed(u64);
    ///
    /// impl Clock for Fixed {
    ///     fn now(&self) -> u64 {
    ///         self.0
    ///     }
    /// }
    ///
    /// let registry = Registry::new();
    /// provide!(registry, Fixed(7) => dyn Clock);
    ///
    /// let clock: Arc<dyn Clock> = registry.get_interface().unwrap();
    /// assert_eq!(clock.now(), 7);
    /// ```
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InterfaceNotFound`] if no stored value declared `I`
    /// - [`RegistryError::Ambiguous`] under [`ResolutionPolicy::RejectAmbiguous`]
    pub fn get_interface<I>(&self) -> Result<Arc<I>, RegistryError>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let interface = DependencyKey::of::<I>();

        let mut candidates: Vec<(u64, &'static str, Arc<I>)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let binding = entry.interfaces.iter().find(|b| b.key == interface)?;
                let handle = binding.handle.downcast_ref::<Arc<I>>()?;
                Some((entry.sequence, entry.key().type_name(), Arc::clone(handle)))
            })
            .collect();
        candidates.sort_by_key(|(sequence, ..)| *sequence);

        let result = match (self.options.resolution, candidates.len()) {
            (_, 0) => Err(RegistryError::InterfaceNotFound {
                interface: interface.type_name(),
            }),
            (ResolutionPolicy::RejectAmbiguous, n) if n > 1 => Err(RegistryError::Ambiguous {
                interface: interface.type_name(),
                candidates: candidates.iter().map(|(_, name, _)| *name).collect(),
            }),
            _ => candidates
                .pop()
                .map(|(.., handle)| handle)
                .ok_or(RegistryError::InterfaceNotFound {
                    interface: interface.type_name(),
                }),
        };

        trace!(
            target: "capability_registry",
            interface = interface.type_name(),
            found = result.is_ok(),
            "get_interface"
        );
        self.emit_event(|| RegistryEvent::GetInterface {
            interface: interface.type_name(),
            found: result.is_ok(),
        });

        result
    }

    /// Checks whether a value of type `T` is stored.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        let key = DependencyKey::of::<T>();
        let found = self.entries.contains_key(&key);

        trace!(
            target: "capability_registry",
            type_name = key.type_name(),
            found,
            "contains"
        );
        self.emit_event(|| RegistryEvent::Contains {
            type_name: key.type_name(),
            found,
        });

        found
    }

    /// Checks whether any stored value was provided with interface `I`.
    pub fn contains_interface<I: ?Sized + 'static>(&self) -> bool {
        let interface = DependencyKey::of::<I>();
        let found = self
            .entries
            .iter()
            .any(|entry| entry.interfaces.iter().any(|b| b.key == interface));

        trace!(
            target: "capability_registry",
            interface = interface.type_name(),
            found,
            "contains_interface"
        );
        self.emit_event(|| RegistryEvent::ContainsInterface {
            interface: interface.type_name(),
            found,
        });

        found
    }

    /// Number of stored values. Plain accessor, emits no events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of all stored values, in no particular order.
    pub fn keys(&self) -> Vec<DependencyKey> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }

    // -------------------------------------------------------------------------------------------------
    // Reset
    // -------------------------------------------------------------------------------------------------

    /// Discards every stored value.
    ///
    /// Meant for isolating tests. Already retrieved `Arc`s stay valid, the
    /// tracing callback and options are kept. Operations running concurrently
    /// with a reset may or may not observe the old values; quiesce callers first
    /// if that matters.
    ///
    /// Values are dropped after every shard lock is released, so a `Drop`
    /// impl may call back into the registry.
    pub fn reset(&self) {
        let keys: Vec<DependencyKey> = self.entries.iter().map(|entry| *entry.key()).collect();
        let drained: Vec<Entry> = keys
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .map(|(_, entry)| entry)
            .collect();
        let discarded = drained.len();
        drop(drained);

        trace!(target: "capability_registry", discarded, "reset");
        self.emit_event(|| RegistryEvent::Reset { discarded });
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.entries.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    trait Store: Send + Sync {
        fn name(&self) -> &str;
    }

    trait Health: Send + Sync {
        fn healthy(&self) -> bool;
    }

    struct Memory;

    impl Store for Memory {
        fn name(&self) -> &str {
            "memory"
        }
    }

    impl Health for Memory {
        fn healthy(&self) -> bool {
            true
        }
    }

    struct Disk;

    impl Store for Disk {
        fn name(&self) -> &str {
            "disk"
        }
    }

    #[test]
    fn test_provide_and_get_primitive() -> Result<(), RegistryError> {
        let registry = Registry::new();
        registry.provide(42i32);

        let num: Arc<i32> = registry.get()?;
        assert_eq!(*num, 42);

        let num_2 = registry.get::<i32>()?;
        assert_eq!(*num_2, 42);

        Ok(())
    }

    #[test]
    fn test_get_nonexistent() {
        let registry = Registry::new();

        let result: Result<Arc<String>, RegistryError> = registry.get();
        assert_eq!(
            result.unwrap_err(),
            RegistryError::NotFound {
                type_name: "alloc::string::String"
            }
        );
    }

    #[test]
    fn test_overwrite_same_type() {
        let registry = Registry::new();

        registry.provide(10i32);
        registry.provide(20i32);

        let num: Arc<i32> = registry.get().unwrap();
        assert_eq!(*num, 20);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_provide_arc_preserves_identity() {
        let registry = Registry::new();
        let value = Arc::new("shared".to_string());
        registry.provide_arc(Arc::clone(&value));

        let retrieved: Arc<String> = registry.get().unwrap();
        assert!(Arc::ptr_eq(&value, &retrieved));
        assert_eq!(Arc::strong_count(&value), 3); // value + registry + retrieved
    }

    #[test]
    fn test_provide_boxed_keys_on_inner_type() {
        let registry = Registry::new();
        registry.provide_boxed(Box::new(5u16));

        assert_eq!(*registry.get::<u16>().unwrap(), 5);
        assert!(!registry.contains::<Box<u16>>());
    }

    #[test]
    fn test_get_cloned() {
        let registry = Registry::new();
        registry.provide("hello".to_string());

        let value: String = registry.get_cloned().unwrap();
        assert_eq!(value, "hello");
    }

    #[test]
    fn test_get_interface() {
        let registry = Registry::new();
        registry.provide_dependency(Dependency::new(Memory).implements::<dyn Store>(|v| v));

        let store: Arc<dyn Store> = registry.get_interface().unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_interface_shares_value_with_exact_lookup() {
        let registry = Registry::new();
        registry.provide_dependency(
            Dependency::new(Memory)
                .implements::<dyn Store>(|v| v)
                .implements::<dyn Health>(|v| v),
        );

        let concrete: Arc<Memory> = registry.get().unwrap();
        let store: Arc<dyn Store> = registry.get_interface().unwrap();
        let health: Arc<dyn Health> = registry.get_interface().unwrap();

        assert!(health.healthy());
        assert!(std::ptr::eq(
            Arc::as_ptr(&concrete) as *const (),
            Arc::as_ptr(&store) as *const ()
        ));
        assert!(std::ptr::eq(
            Arc::as_ptr(&store) as *const (),
            Arc::as_ptr(&health) as *const ()
        ));
    }

    #[test]
    fn test_interface_not_found() {
        let registry = Registry::new();
        registry.provide(Memory);

        let err = registry.get_interface::<dyn Store>().err().unwrap();
        assert!(matches!(err, RegistryError::InterfaceNotFound { .. }));
        assert!(err.to_string().contains("Store"));
    }

    #[test]
    fn test_most_recent_wins() {
        let registry = Registry::new();
        registry.provide_dependency(Dependency::new(Memory).implements::<dyn Store>(|v| v));
        registry.provide_dependency(Dependency::new(Disk).implements::<dyn Store>(|v| v));

        assert_eq!(registry.get_interface::<dyn Store>().unwrap().name(), "disk");

        // Re-providing moves Memory to the front again.
        registry.provide_dependency(Dependency::new(Memory).implements::<dyn Store>(|v| v));
        assert_eq!(registry.get_interface::<dyn Store>().unwrap().name(), "memory");
    }

    #[test]
    fn test_reject_ambiguous() {
        let registry = Registry::with_options(
            RegistryOptions::default().with_resolution(ResolutionPolicy::RejectAmbiguous),
        );
        registry.provide_dependency(Dependency::new(Memory).implements::<dyn Store>(|v| v));
        assert_eq!(registry.get_interface::<dyn Store>().unwrap().name(), "memory");

        registry.provide_dependency(Dependency::new(Disk).implements::<dyn Store>(|v| v));
        match registry.get_interface::<dyn Store>() {
            Err(RegistryError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].ends_with("Memory"));
                assert!(candidates[1].ends_with("Disk"));
            }
            other => panic!("expected ambiguity, got {:?}", other.map(|s| s.name().to_string())),
        }
    }

    #[test]
    fn test_overwrite_drops_old_bindings() {
        let registry = Registry::new();
        registry.provide_dependency(Dependency::new(Memory).implements::<dyn Store>(|v| v));
        registry.provide(Memory);

        assert!(registry.contains::<Memory>());
        assert!(!registry.contains_interface::<dyn Store>());
        assert!(registry.get_interface::<dyn Store>().is_err());
    }

    #[test]
    fn test_contains_and_len() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains::<u32>());

        registry.provide(1u32);
        assert!(registry.contains::<u32>());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys(), vec![DependencyKey::of::<u32>()]);
    }

    #[test]
    fn test_reset() {
        let registry = Registry::new();
        registry.provide(1u8);
        registry.provide_dependency(Dependency::new(Memory).implements::<dyn Store>(|v| v));
        let kept: Arc<u8> = registry.get().unwrap();

        registry.reset();

        assert!(registry.is_empty());
        assert!(registry.get::<u8>().unwrap_err().is_not_found());
        assert!(registry
            .get_interface::<dyn Store>()
            .err()
            .is_some_and(|e| e.is_not_found()));
        assert_eq!(*kept, 1);

        registry.provide(2u8);
        assert_eq!(*registry.get::<u8>().unwrap(), 2);
    }

    #[test]
    fn test_reset_lets_values_reenter_on_drop() {
        use std::sync::atomic::AtomicBool;
        use std::sync::{mpsc, LazyLock};
        use std::time::Duration;

        static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);
        static DROPPED: AtomicBool = AtomicBool::new(false);

        struct Reentrant;

        impl Drop for Reentrant {
            fn drop(&mut self) {
                let _ = REGISTRY.contains::<Reentrant>();
                let _ = REGISTRY.len();
                DROPPED.store(true, Ordering::SeqCst);
            }
        }

        REGISTRY.provide(Reentrant);
        REGISTRY.provide(Reentrant);
        REGISTRY.provide(1u8);

        let (done_tx, done_rx) = mpsc::channel();
        std::thread::spawn(move || {
            REGISTRY.reset();
            let _ = done_tx.send(());
        });

        assert!(
            done_rx.recv_timeout(Duration::from_secs(5)).is_ok(),
            "reset blocked while dropping a stored value"
        );
        assert!(DROPPED.load(Ordering::SeqCst));
        assert!(REGISTRY.is_empty());
    }

    #[test]
    fn test_stored_entry_carries_latest_sequence() {
        let registry = Arc::new(Registry::new());

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..200u32 {
                        registry.provide(t * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = registry
            .entries
            .get(&DependencyKey::of::<u32>())
            .map(|entry| entry.sequence)
            .unwrap();
        assert_eq!(stored, registry.sequence.load(Ordering::SeqCst) - 1);
    }

    #[test]
    fn test_provide_keeps_pointer_types_as_is() {
        let registry = Registry::new();
        registry.provide(Arc::new(3u64));
        registry.provide(Box::new(4i16));

        assert!(registry.contains::<Arc<u64>>());
        assert!(registry.contains::<Box<i16>>());
        assert!(!registry.contains::<u64>());
        assert!(!registry.contains::<i16>());

        registry.provide_arc(Arc::new(5u64));
        assert_eq!(*registry.get::<u64>().unwrap(), 5);
    }

    #[test]
    fn test_function_pointer_registration() {
        let registry = Registry::new();

        let multiply_by_two: fn(i32) -> i32 = |x| x * 2;
        registry.provide(multiply_by_two);

        let doubler: Arc<fn(i32) -> i32> = registry.get().unwrap();
        assert_eq!(doubler(21), 42);
    }

    #[test]
    fn test_trace_callback_events() {
        use std::sync::Mutex as StdMutex;

        let registry = Registry::new();
        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = events.clone();

        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(format!("{}", e));
        });

        registry.provide(5u8);
        let _ = registry.get::<u8>();
        let _ = registry.get_interface::<dyn Store>();
        let _ = registry.contains::<u8>();
        let _ = registry.contains_interface::<dyn Store>();
        registry.reset();

        registry.clear_trace_callback();
        registry.provide(6u8);

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "provide { type_name: u8, interfaces: [] }".to_string(),
                "get { type_name: u8, found: true }".to_string(),
                format!(
                    "get_interface {{ interface: {}, found: false }}",
                    std::any::type_name::<dyn Store>()
                ),
                "contains { type_name: u8, found: true }".to_string(),
                format!(
                    "contains_interface {{ interface: {}, found: false }}",
                    std::any::type_name::<dyn Store>()
                ),
                "reset { discarded: 1 }".to_string(),
            ]
        );
    }

    #[test]
    fn test_trace_callback_may_reenter() {
        let registry = Arc::new(Registry::new());
        let inner = Arc::clone(&registry);

        registry.set_trace_callback(move |event| {
            if let RegistryEvent::Provide { .. } = event {
                let _ = inner.contains::<u64>();
            }
        });

        registry.provide(1u64);
        assert!(registry.contains::<u64>());
        registry.clear_trace_callback();
    }

    #[test]
    fn test_debug_format() {
        let registry = Registry::new();
        registry.provide(1u8);
        let rendered = format!("{:?}", registry);
        assert!(rendered.starts_with("Registry { len: 1"));
    }
}
