/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use capability_registry::RegistryEvent;
///
/// let event = RegistryEvent::Provide { type_name: "i32", interfaces: vec![] };
/// assert_eq!(event.to_string(), "provide { type_name: i32, interfaces: [] }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A value was stored in the registry.
    Provide {
        /// The concrete type name of the stored value (e.g. "i32", "alloc::string::String")
        type_name: &'static str,
        /// Interfaces the value was bound to at provide time
        interfaces: Vec<&'static str>,
    },

    /// A value was requested by its concrete type.
    Get {
        /// The type name that was requested
        type_name: &'static str,
        /// Whether the value was found in the registry
        found: bool,
    },

    /// A value was requested by an interface it implements.
    GetInterface {
        /// The interface (trait object) type name that was requested
        interface: &'static str,
        /// Whether a matching value was resolved
        found: bool,
    },

    /// A type existence check was performed.
    Contains {
        /// The type name that was checked
        type_name: &'static str,
        /// Whether the type exists in the registry
        found: bool,
    },

    /// An interface existence check was performed.
    ContainsInterface {
        /// The interface (trait object) type name that was checked
        interface: &'static str,
        /// Whether any stored value was provided with that interface
        found: bool,
    },

    /// The registry was reset.
    Reset {
        /// Number of entries discarded
        discarded: usize,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Provide {
                type_name,
                interfaces,
            } => {
                write!(
                    f,
                    "provide {{ type_name: {}, interfaces: [{}] }}",
                    type_name,
                    interfaces.join(", ")
                )
            }
            RegistryEvent::Get { type_name, found } => {
                write!(f, "get {{ type_name: {}, found: {} }}", type_name, found)
            }
            RegistryEvent::GetInterface { interface, found } => {
                write!(
                    f,
                    "get_interface {{ interface: {}, found: {} }}",
                    interface, found
                )
            }
            RegistryEvent::Contains { type_name, found } => {
                write!(
                    f,
                    "contains {{ type_name: {}, found: {} }}",
                    type_name, found
                )
            }
            RegistryEvent::ContainsInterface { interface, found } => {
                write!(
                    f,
                    "contains_interface {{ interface: {}, found: {} }}",
                    interface, found
                )
            }
            RegistryEvent::Reset { discarded } => {
                write!(f, "reset {{ discarded: {} }}", discarded)
            }
        }
    }
}
