//! Module resolution, caching, loading and registration.

pub mod cache;
pub mod loader;
pub mod registry;
pub mod resolver;

pub use cache::{CacheSnapshot, DedupCache, Outcome, Pending};
pub use loader::{LoadError, ModuleLoader, ModuleRecord};
pub use registry::{ComponentRegistry, RegistryBinder, RegistryError};
pub use resolver::{ModuleResolver, Namespace, ResourcePath};
