//! Grove - on-demand module loader for hash-routed single-page front ends.
//!
//! Pages are assembled from separately defined fragments fetched by logical
//! name. Grove resolves names to paths, keeps at most one fetch in flight per
//! name, caches what loads, binds components into the rendering registry once,
//! and boots the router class with a production-to-development fallback.

mod defaults;
pub mod config;
pub mod error;

pub mod fetch;
pub mod frontend;
pub mod module;
pub mod router;

pub use error::{Error, Result};

pub use config::{ConfigError, Environment, LoaderConfig};

pub use fetch::{FetchError, FsSource, ModuleExports, ModuleSource, ModuleTable};

pub use module::cache::{CacheSnapshot, DedupCache, Outcome, Pending};
pub use module::loader::{LoadError, ModuleLoader, ModuleRecord};
pub use module::registry::{ComponentRegistry, RegistryBinder, RegistryError};
pub use module::resolver::{ModuleResolver, Namespace, ResourcePath};

pub use router::bootstrap::{BootstrapState, RouterBootstrap};
pub use router::hash::{parse_hash, RouteRequest};

pub use frontend::{BatchFailure, BatchOutcome, Frontend, LoaderInfo};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
