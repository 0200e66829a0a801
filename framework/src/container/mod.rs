//! Dependency container
//!
//! Stores one shared instance per concrete service type for request handlers.
//!
//! A container is filled once during bootstrap, frozen into the
//! [`crate::AppContext`] and only read afterwards, so lookups take no locks.
//! Tests build their own container with fakes in place of the real services.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut container = Container::new();
//! container.singleton(ServiceRegistry::unavailable());
//!
//! let registry: ServiceRegistry = container.get().unwrap();
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FrameworkError;

/// The service container
///
/// Stores type-erased instances keyed by TypeId.
#[derive(Default)]
pub struct Container {
    bindings: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Container {
    /// Create a new empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton instance (shared across all resolutions)
    pub fn singleton<T: Any + Send + Sync + 'static>(&mut self, instance: T) {
        self.bindings.insert(TypeId::of::<T>(), Arc::new(instance));
    }

    /// Resolve a concrete type (requires Clone)
    pub fn get<T: Any + Send + Sync + Clone + 'static>(&self) -> Option<T> {
        self.bindings
            .get(&TypeId::of::<T>())?
            .downcast_ref::<T>()
            .cloned()
    }

    /// Resolve a concrete type, returning an error if not found
    pub fn resolve<T: Any + Send + Sync + Clone + 'static>(&self) -> Result<T, FrameworkError> {
        self.get::<T>()
            .ok_or_else(FrameworkError::service_not_found::<T>)
    }

    /// Check if a concrete type is registered
    pub fn has<T: Any + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_singleton_resolves_clone() {
        let mut container = Container::new();
        assert!(container.is_empty());

        container.singleton(Counter(7));
        assert!(container.has::<Counter>());
        assert_eq!(container.get::<Counter>(), Some(Counter(7)));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_resolve_missing_is_error() {
        let container = Container::new();
        let err = container.resolve::<Counter>().unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
