/// How [`Registry::get_interface`](crate::Registry::get_interface) picks between
/// several stored values that implement the requested interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// The value provided last wins.
    #[default]
    MostRecent,
    /// More than one candidate is an error listing all of them.
    RejectAmbiguous,
}

/// Construction-time settings for a [`Registry`](crate::Registry).
///
/// ```rust
/// use capability_registry::{Registry, RegistryOptions, ResolutionPolicy};
///
/// let registry = Registry::with_options(
///     RegistryOptions::default().with_resolution(ResolutionPolicy::RejectAmbiguous),
/// );
/// assert_eq!(registry.options().resolution, ResolutionPolicy::RejectAmbiguous);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryOptions {
    pub resolution: ResolutionPolicy,
}

impl RegistryOptions {
    pub const fn new() -> Self {
        Self {
            resolution: ResolutionPolicy::MostRecent,
        }
    }

    pub const fn with_resolution(mut self, resolution: ResolutionPolicy) -> Self {
        self.resolution = resolution;
        self
    }
}
