//! Macros for named registries and for providing values with interfaces.

/// Declares a named process-wide registry.
///
/// The macro generates a module containing:
/// - A lazily created `Registry` static (hidden)
/// - `registry()` returning `&'static Registry`
/// - Free functions mirroring the crate-level ones (`provide`, `get`, `reset`, ...)
///
/// An optional second argument supplies [`RegistryOptions`](crate::RegistryOptions).
/// It is evaluated inside the generated module, so use absolute paths.
///
/// # Examples
///
/// ```rust
/// use capability_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(services);
///
/// services::provide(42i32);
/// services::provide("Hello".to_string());
///
/// let num: Arc<i32> = services::get().unwrap();
/// let msg: Arc<String> = services::get().unwrap();
///
/// assert_eq!(*num, 42);
/// assert_eq!(&**msg, "Hello");
/// ```
///
/// # Multiple Registries
///
/// ```rust
/// use capability_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::provide("db_connection".to_string());
///
/// assert!(database::get::<String>().is_ok());
/// assert!(cache::get::<String>().is_err());
/// ```
///
/// # Options
///
/// ```rust
/// use capability_registry::define_registry;
///
/// define_registry!(
///     strict,
///     capability_registry::RegistryOptions::new()
///         .with_resolution(capability_registry::ResolutionPolicy::RejectAmbiguous)
/// );
///
/// assert_eq!(
///     strict::registry().options().resolution,
///     capability_registry::ResolutionPolicy::RejectAmbiguous
/// );
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        $crate::define_registry!($name, $crate::RegistryOptions::new());
    };
    ($name:ident, $options:expr) => {
        pub mod $name {
            #![allow(dead_code)]

            use std::sync::{Arc, LazyLock};

            static REGISTRY: LazyLock<$crate::Registry> =
                LazyLock::new(|| $crate::Registry::with_options($options));

            /// The registry behind this module's functions.
            pub fn registry() -> &'static $crate::Registry {
                &REGISTRY
            }

            pub fn provide<T: Send + Sync + 'static>(value: T) {
                REGISTRY.provide(value)
            }

            pub fn provide_arc<T: Send + Sync + 'static>(value: Arc<T>) {
                REGISTRY.provide_arc(value)
            }

            pub fn provide_boxed<T: Send + Sync + 'static>(value: Box<T>) {
                REGISTRY.provide_boxed(value)
            }

            pub fn provide_dependency<T: Send + Sync + 'static>(
                dependency: $crate::Dependency<T>,
            ) {
                REGISTRY.provide_dependency(dependency)
            }

            pub fn get<T: Send + Sync + 'static>() -> Result<Arc<T>, $crate::RegistryError> {
                REGISTRY.get()
            }

            pub fn get_cloned<T: Send + Sync + Clone + 'static>(
            ) -> Result<T, $crate::RegistryError> {
                REGISTRY.get_cloned()
            }

            pub fn get_interface<I: ?Sized + Send + Sync + 'static>(
            ) -> Result<Arc<I>, $crate::RegistryError> {
                REGISTRY.get_interface()
            }

            pub fn contains<T: Send + Sync + 'static>() -> bool {
                REGISTRY.contains::<T>()
            }

            pub fn contains_interface<I: ?Sized + 'static>() -> bool {
                REGISTRY.contains_interface::<I>()
            }

            pub fn reset() {
                REGISTRY.reset()
            }

            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}

/// Provides a value together with the interfaces it should resolve as.
///
/// `provide!(registry, value => dyn A, dyn B)` targets the given registry,
/// `provide!(value => dyn A)` the global one. Each interface gets an unsizing
/// cast `Arc<T> as Arc<dyn A>`, so the value must implement every listed trait.
///
/// ```rust
/// use capability_registry::{provide, Registry};
/// use std::sync::Arc;
///
/// trait Named: Send + Sync {
///     fn name(&self) -> &str;
/// }
///
/// struct Service;
///
/// impl Named for Service {
///     fn name(&self) -> &str {
///         "service"
///     }
/// }
///
/// let registry = Registry::new();
/// provide!(registry, Service => dyn Named);
///
/// let named: Arc<dyn Named> = registry.get_interface().unwrap();
/// assert_eq!(named.name(), "service");
/// assert!(registry.get::<Service>().is_ok());
/// ```
#[macro_export]
macro_rules! provide {
    ($registry:expr, $value:expr => $($interface:ty),+ $(,)?) => {
        $registry.provide_dependency(
            $crate::Dependency::new($value)
                $(.implements::<$interface>(|value| value as ::std::sync::Arc<$interface>))+
        )
    };
    ($value:expr => $($interface:ty),+ $(,)?) => {
        $crate::global().provide_dependency(
            $crate::Dependency::new($value)
                $(.implements::<$interface>(|value| value as ::std::sync::Arc<$interface>))+
        )
    };
}
