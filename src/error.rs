//! Error types for grove.

use thiserror::Error;

/// Grove error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A module could not be loaded
    #[error("Load error: {0}")]
    Load(#[from] crate::module::loader::LoadError),

    /// The rendering registry refused a binding
    #[error("Registry error: {0}")]
    Registry(#[from] crate::module::registry::RegistryError),

    /// Configuration could not be read or resolved
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for grove operations.
pub type Result<T> = std::result::Result<T, Error>;
