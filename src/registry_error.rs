use thiserror::Error;

/// Errors returned by registry lookups.
///
/// Registration never fails; only the `get*` family returns these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No value is stored under the requested concrete type.
    #[error("dependency not found for type {type_name}")]
    NotFound { type_name: &'static str },

    /// No stored value declared the requested interface when it was provided.
    #[error("no dependency implements interface {interface}")]
    InterfaceNotFound { interface: &'static str },

    /// Several stored values implement the interface and the registry was
    /// configured with [`ResolutionPolicy::RejectAmbiguous`](crate::ResolutionPolicy::RejectAmbiguous).
    #[error("interface {interface} is implemented by {} dependencies: {}", .candidates.len(), .candidates.join(", "))]
    Ambiguous {
        interface: &'static str,
        candidates: Vec<&'static str>,
    },

    /// The stored value could not be downcast to the requested type.
    #[error("type mismatch in registry for type {type_name}")]
    TypeMismatch { type_name: &'static str },
}

impl RegistryError {
    /// Returns `true` for both exact-type and interface misses.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound { .. } | RegistryError::InterfaceNotFound { .. }
        )
    }
}
