//! Logical name resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Environment, LoaderConfig};

/// Separate namespaces for logical names; the same name may exist in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Component,
    Route,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component => write!(f, "component"),
            Self::Route => write!(f, "route"),
        }
    }
}

/// Identifier handed to a [`crate::fetch::ModuleSource`].
///
/// For a filesystem source this is a relative file path; for a factory table it is
/// simply the table key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePath(String);

impl ResourcePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourcePath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ResourcePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Location and extension of one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NamespaceLayout {
    base: String,
    extension: String,
}

impl NamespaceLayout {
    fn new(base: &str, extension: &str) -> Self {
        Self {
            base: trim_base(base),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    fn path_for(&self, name: &str) -> ResourcePath {
        ResourcePath(join(&self.base, &format!("{}.{}", name, self.extension)))
    }
}

/// Maps a logical name and environment to the path the source fetches.
///
/// Pure: no I/O, and the same inputs always give the same path. Callers reject
/// empty names before resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolver {
    components: NamespaceLayout,
    routes: NamespaceLayout,
    router_base: String,
}

impl ModuleResolver {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            components: NamespaceLayout::new(&config.base_path, &config.component_extension),
            routes: NamespaceLayout::new(&config.routes_path, &config.route_extension),
            router_base: trim_base(&config.router_path),
        }
    }

    /// Resolve a component or route name.
    ///
    /// Components and routes do not vary by environment; the parameter is kept so
    /// every resolution shares one shape.
    pub fn resolve(&self, namespace: Namespace, name: &str, _env: Environment) -> ResourcePath {
        match namespace {
            Namespace::Component => self.components.path_for(name),
            Namespace::Route => self.routes.path_for(name),
        }
    }

    /// Resolve the router class build for `env`.
    pub fn router_path(&self, env: Environment) -> ResourcePath {
        let file = match env {
            Environment::Production => "router.min.js",
            Environment::Development => "router.js",
        };
        ResourcePath(join(&self.router_base, file))
    }
}

/// Drop trailing slashes, keeping a bare root as `/`.
fn trim_base(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() && base.starts_with('/') {
        return "/".to_string();
    }
    trimmed.to_string()
}

fn join(base: &str, file: &str) -> String {
    if base.is_empty() {
        file.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, file)
    } else {
        format!("{}/{}", base, file)
    }
}
