//! Key derivation and the provision builder.
//!
//! A [`DependencyKey`] identifies a concrete type by its `TypeId`; the type name
//! travels along for diagnostics only. A [`Dependency`] bundles a value with the
//! interfaces (trait object types) it should be resolvable as, recorded at the
//! call site where the concrete type is still known.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a registered type.
///
/// Equality and hashing use only the `TypeId`, so two distinct types can never
/// share a key. The name is the full path reported by [`std::any::type_name`]
/// (`alloc::string::String`, `my_app::Database`); built-in types have no module
/// path (`i32`).
///
/// ```rust
/// use capability_registry::DependencyKey;
///
/// let key = DependencyKey::of::<u64>();
/// assert_eq!(key.type_name(), "u64");
/// assert_eq!(key, DependencyKey::of::<u64>());
/// assert_ne!(key, DependencyKey::of::<i64>());
/// ```
#[derive(Clone, Copy)]
pub struct DependencyKey {
    id: TypeId,
    name: &'static str,
}

impl DependencyKey {
    /// Derives the key of `T`.
    ///
    /// `T` may be unsized, which is how interface keys (`dyn Trait`) are formed.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DependencyKey {}

impl Hash for DependencyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DependencyKey").field(&self.name).finish()
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An interface view of a provided value: an `Arc<I>` behind `dyn Any`.
pub(crate) struct InterfaceBinding {
    pub(crate) key: DependencyKey,
    pub(crate) handle: Box<dyn Any + Send + Sync>,
}

/// A value ready to be provided, together with the interfaces it satisfies.
///
/// Rust cannot ask at runtime whether a type implements a trait, so the
/// unsizing cast to each trait object is captured here instead. The cast must
/// return the `Arc` it was given (usually `|v| v`), which keeps the interface
/// handle and the concrete value pointing at the same allocation.
///
/// ```rust
/// use capability_registry::{Dependency, Registry};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let registry = Registry::new();
/// registry.provide_dependency(Dependency::new(English).implements::<dyn Greeter>(|v| v));
///
/// let greeter: Arc<dyn Greeter> = registry.get_interface().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub struct Dependency<T> {
    value: Arc<T>,
    interfaces: Vec<InterfaceBinding>,
}

impl<T: Send + Sync + 'static> Dependency<T> {
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an existing `Arc`; the registry will hand out clones of it.
    pub fn from_arc(value: Arc<T>) -> Self {
        Self {
            value,
            interfaces: Vec::new(),
        }
    }

    pub fn from_box(value: Box<T>) -> Self {
        Self::from_arc(Arc::from(value))
    }

    /// Declares that the value can be resolved as `I`.
    ///
    /// Declaring the same interface twice keeps the last cast.
    ///
    /// # Panics
    ///
    /// If `cast` returns an `Arc` other than the one it was given. Interface
    /// lookups must share the stored allocation.
    pub fn implements<I>(mut self, cast: impl FnOnce(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let handle = cast(Arc::clone(&self.value));
        assert!(
            std::ptr::eq(
                Arc::as_ptr(&handle) as *const (),
                Arc::as_ptr(&self.value) as *const ()
            ),
            "interface cast for {} must return the provided Arc",
            type_name::<I>()
        );

        let key = DependencyKey::of::<I>();
        self.interfaces.retain(|binding| binding.key != key);
        self.interfaces.push(InterfaceBinding {
            key,
            handle: Box::new(handle),
        });
        self
    }

    /// Key the value will be stored under.
    pub fn key(&self) -> DependencyKey {
        DependencyKey::of::<T>()
    }

    /// Interfaces declared so far, in declaration order.
    pub fn interfaces(&self) -> impl Iterator<Item = DependencyKey> + '_ {
        self.interfaces.iter().map(|binding| binding.key)
    }

    pub(crate) fn into_parts(self) -> (Arc<dyn Any + Send + Sync>, Vec<InterfaceBinding>) {
        (self.value, self.interfaces)
    }
}

impl<T> fmt::Debug for Dependency<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("type_name", &type_name::<T>())
            .field(
                "interfaces",
                &self
                    .interfaces
                    .iter()
                    .map(|binding| binding.key.type_name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
