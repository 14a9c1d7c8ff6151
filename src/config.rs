//! Loader configuration and build environment.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults;

/// Errors raised while reading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown environment '{0}' (expected 'development' or 'production')")]
    UnknownEnvironment(String),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build variant the front end runs under.
///
/// Resolved once when the [`LoaderConfig`] is turned into a running loader and
/// never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Resolve from an explicit setting, falling back to `GROVE_ENV`, then production.
    pub fn resolve(explicit: Option<Environment>) -> Result<Self, ConfigError> {
        if let Some(env) = explicit {
            return Ok(env);
        }

        match std::env::var(defaults::ENVIRONMENT_VAR) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Environment::Production),
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration consumed when constructing a [`crate::Frontend`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Base path for component modules
    #[serde(default = "defaults::base_path")]
    pub base_path: String,
    /// Base path for route pages
    #[serde(default = "defaults::routes_path")]
    pub routes_path: String,
    /// Directory holding the router class builds
    #[serde(default = "defaults::router_path")]
    pub router_path: String,
    #[serde(default = "defaults::component_extension")]
    pub component_extension: String,
    #[serde(default = "defaults::route_extension")]
    pub route_extension: String,
    /// When false, completed loads are never cached (in-flight dedup still applies)
    #[serde(default = "defaults::cache")]
    pub cache: bool,
    /// Components registered up front by `Frontend::register_globals`
    #[serde(default)]
    pub global_components: Vec<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
    /// Route used for an empty hash
    #[serde(default = "defaults::default_route")]
    pub default_route: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_path: defaults::base_path(),
            routes_path: defaults::routes_path(),
            router_path: defaults::router_path(),
            component_extension: defaults::component_extension(),
            route_extension: defaults::route_extension(),
            cache: defaults::CACHE,
            global_components: Vec::new(),
            environment: None,
            default_route: defaults::default_route(),
        }
    }
}

impl LoaderConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The environment this configuration runs under.
    pub fn resolve_environment(&self) -> Result<Environment, ConfigError> {
        Environment::resolve(self.environment)
    }
}
