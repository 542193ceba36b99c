//! # Capability Registry
//!
//! A thread-safe dependency registry for storing and retrieving shared instances.
//! Values are looked up either by their concrete type or by any interface
//! (trait object type) they were provided as.
//!
//! Any type that implements `Send + Sync + 'static` can be stored; the registry
//! keeps at most one value per concrete type.
//!
//! ## Quick Start
//!
//! ```rust
//! use capability_registry::{get, get_interface, provide, provide_dependency, Dependency};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "Hello, World!".to_string()
//!     }
//! }
//!
//! // Exact type
//! provide(42i32);
//! let num: Arc<i32> = get().unwrap();
//! assert_eq!(*num, 42);
//!
//! // Interface
//! provide_dependency(Dependency::new(English).implements::<dyn Greeter>(|v| v));
//! let greeter: Arc<dyn Greeter> = get_interface().unwrap();
//! assert_eq!(greeter.greet(), "Hello, World!");
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: storage is a sharded concurrent map; every operation can be called from any thread
//! - **Type-safe**: keys are `TypeId`s, so a value can only come back as the type it was stored as
//! - **Interface lookup**: interfaces are declared at provide time and resolved deterministically
//! - **Tracing support**: `tracing` events plus an optional callback for monitoring registry operations
//!
//! ## Main Functions
//!
//! - [`provide`] / [`provide_arc`] / [`provide_dependency`] / [`provide!`] - Store a value
//! - [`get`] - Retrieve a value by concrete type as `Arc<T>`
//! - [`get_interface`] - Retrieve a value through an interface as `Arc<dyn Trait>`
//! - [`reset`] - Discard every stored value
//! - [`Registry`] - The same operations on an explicitly owned registry
//! - [`define_registry!`] - Declare additional named process-wide registries

mod dependency;
mod global;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod registry_options;

pub use dependency::{Dependency, DependencyKey};
pub use global::{
    clear_trace_callback, contains, contains_interface, get, get_cloned, get_interface, global,
    provide, provide_arc, provide_boxed, provide_dependency, reset, set_trace_callback,
};
pub use registry::{Registry, TraceCallback};
pub use registry_error::RegistryError;
pub use registry_event::RegistryEvent;
pub use registry_options::{RegistryOptions, ResolutionPolicy};
