//! Fetching and normalizing a single module.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Environment;
use crate::fetch::{FetchError, ModuleExports, ModuleSource};
use crate::module::resolver::{ModuleResolver, Namespace, ResourcePath};

/// Errors that can occur while loading a module.
///
/// Cloneable so a single settled load can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Module name must not be empty")]
    EmptyName,

    #[error("Module '{name}' not found at {path}")]
    NotFound { name: String, path: ResourcePath },

    #[error("Module '{name}' at {path} has no usable default export")]
    Shape { name: String, path: ResourcePath },

    #[error("Failed to load module '{name}' from {path}: {reason}")]
    Fetch {
        name: String,
        path: ResourcePath,
        reason: String,
    },

    #[error("Load of module '{name}' stopped before settling")]
    Interrupted { name: String },
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }

    /// Logical name the failure belongs to, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            LoadError::EmptyName => None,
            LoadError::NotFound { name, .. }
            | LoadError::Shape { name, .. }
            | LoadError::Fetch { name, .. }
            | LoadError::Interrupted { name } => Some(name),
        }
    }

    fn from_fetch(name: &str, path: &ResourcePath, err: FetchError) -> Self {
        match err {
            FetchError::NotFound(_) => LoadError::NotFound {
                name: name.to_string(),
                path: path.clone(),
            },
            FetchError::Failed { reason, .. } => LoadError::Fetch {
                name: name.to_string(),
                path: path.clone(),
                reason,
            },
        }
    }
}

/// A successfully loaded module.
///
/// Never mutated once it leaves the loader; the cache hands out shared references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleRecord {
    /// Module name; backfilled from the requested name when the export has none
    pub name: String,
    /// Where the module was fetched from
    pub path: ResourcePath,
    /// The default export, minus its style payload
    pub body: Map<String, Value>,
    /// Style payload applied once per logical name on registration
    pub style: Option<String>,
}

/// Fetches modules through a [`ModuleSource`] and validates their shape.
#[derive(Clone)]
pub struct ModuleLoader {
    resolver: Arc<ModuleResolver>,
    source: Arc<dyn ModuleSource>,
    environment: Environment,
}

impl ModuleLoader {
    pub fn new(
        resolver: Arc<ModuleResolver>,
        source: Arc<dyn ModuleSource>,
        environment: Environment,
    ) -> Self {
        Self {
            resolver,
            source,
            environment,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Resolve `name` in `namespace` and load it.
    pub async fn load(&self, namespace: Namespace, name: &str) -> Result<ModuleRecord, LoadError> {
        let path = self.resolver.resolve(namespace, name, self.environment);
        self.load_path(name, path).await
    }

    /// Load `name` from an already resolved path.
    pub async fn load_path(&self, name: &str, path: ResourcePath) -> Result<ModuleRecord, LoadError> {
        log::debug!("Importing module '{}' from {}", name, path);

        let exports = self
            .source
            .import(&path)
            .await
            .map_err(|e| LoadError::from_fetch(name, &path, e))?;

        normalize(name, path, exports)
    }
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("resolver", &self.resolver)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

fn normalize(name: &str, path: ResourcePath, exports: ModuleExports) -> Result<ModuleRecord, LoadError> {
    let mut body = match exports.default {
        Some(Value::Object(body)) => body,
        _ => {
            return Err(LoadError::Shape {
                name: name.to_string(),
                path,
            })
        }
    };

    let style = match body.remove("style") {
        Some(Value::String(css)) => Some(css),
        Some(other) => {
            body.insert("style".to_string(), other);
            None
        }
        None => None,
    };

    // Only a missing (or null) name is backfilled. Any other value stays in the body
    // as exported; the record keeps the logical name unless the export is a usable string.
    let name = match body.get("name") {
        None | Some(Value::Null) => {
            body.insert("name".to_string(), Value::String(name.to_string()));
            name.to_string()
        }
        Some(Value::String(own)) if !own.is_empty() => own.clone(),
        Some(_) => name.to_string(),
    };

    Ok(ModuleRecord {
        name,
        path,
        body,
        style,
    })
}
