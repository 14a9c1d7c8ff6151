//! Factory table keyed by resource path.
//!
//! Built once at startup; each entry constructs a fresh set of exports when
//! imported. Keys are the same strings the resolver produces.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{FetchError, ModuleExports, ModuleSource};
use crate::module::resolver::ResourcePath;

type Factory = Arc<dyn Fn() -> ModuleExports + Send + Sync>;

/// In-memory module source backed by constructor closures.
#[derive(Default, Clone)]
pub struct ModuleTable {
    entries: HashMap<String, Factory>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `key`, replacing any previous entry.
    pub fn insert<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> ModuleExports + Send + Sync + 'static,
    {
        self.entries.insert(key.into(), Arc::new(factory));
        self
    }

    /// Register a fixed default export under `key`.
    pub fn insert_default(&mut self, key: impl Into<String>, definition: Value) -> &mut Self {
        self.insert(key, move || ModuleExports::with_default(definition.clone()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("ModuleTable").field("keys", &keys).finish()
    }
}

#[async_trait]
impl ModuleSource for ModuleTable {
    async fn import(&self, path: &ResourcePath) -> Result<ModuleExports, FetchError> {
        match self.entries.get(path.as_str()) {
            Some(factory) => Ok(factory()),
            None => Err(FetchError::NotFound(path.to_string())),
        }
    }
}
