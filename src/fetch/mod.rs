//! Module fetch primitive.
//!
//! This module provides:
//! - The `ModuleSource` trait the loader imports through
//! - A startup-built factory table (`table`)
//! - A filesystem-backed source for JSON module documents (`fs`)

pub mod fs;
pub mod table;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::module::resolver::ResourcePath;

pub use fs::FsSource;
pub use table::ModuleTable;

/// Errors reported by a [`ModuleSource`].
///
/// The split between `NotFound` and `Failed` is what the router bootstrap keys its
/// fallback on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to fetch {path}: {reason}")]
    Failed { path: String, reason: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// What an import hands back: the module's exports, of which only `default` is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleExports {
    #[serde(default)]
    pub default: Option<Value>,
}

impl ModuleExports {
    pub fn with_default(definition: Value) -> Self {
        Self {
            default: Some(definition),
        }
    }

    /// Exports with no default export at all.
    pub fn empty() -> Self {
        Self { default: None }
    }
}

/// Dynamic-import-like primitive: fetch whatever lives at a resolved path.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    async fn import(&self, path: &ResourcePath) -> Result<ModuleExports, FetchError>;
}
