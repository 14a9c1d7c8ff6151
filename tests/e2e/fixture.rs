//! Shared helpers: counting and gated module sources, and a recording registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use grove::{
    ComponentRegistry, Environment, FetchError, Frontend, LoaderConfig, ModuleExports,
    ModuleRecord, ModuleSource, ModuleTable, RegistryError, ResourcePath,
};

/// Module source that sleeps before each import and counts imports per path.
pub(crate) struct CountingSource {
    table: ModuleTable,
    delay: Duration,
    calls: Mutex<HashMap<String, usize>>,
}

impl CountingSource {
    pub(crate) fn new(table: ModuleTable, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            table,
            delay,
            calls: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn calls_for(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ModuleSource for CountingSource {
    async fn import(&self, path: &ResourcePath) -> Result<ModuleExports, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;
        tokio::time::sleep(self.delay).await;
        self.table.import(path).await
    }
}

/// Module source that holds each import until the test releases it.
pub(crate) struct GatedSource {
    table: ModuleTable,
    entered: Notify,
    release: Notify,
}

impl GatedSource {
    pub(crate) fn new(table: ModuleTable) -> Arc<Self> {
        Arc::new(Self {
            table,
            entered: Notify::new(),
            release: Notify::new(),
        })
    }

    /// Wait until an import has started.
    pub(crate) async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let one held import continue.
    pub(crate) fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl ModuleSource for GatedSource {
    async fn import(&self, path: &ResourcePath) -> Result<ModuleExports, FetchError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.table.import(path).await
    }
}

/// Registry that records every `component` call.
#[derive(Default)]
pub(crate) struct RecordingRegistry {
    pub(crate) bindings: Vec<(String, Arc<ModuleRecord>)>,
    pub(crate) styles: Vec<(String, String)>,
    pub(crate) refuse: Vec<String>,
}

impl ComponentRegistry for RecordingRegistry {
    fn component(&mut self, name: &str, definition: Arc<ModuleRecord>) -> Result<(), RegistryError> {
        if self.refuse.iter().any(|n| n == name) {
            return Err(RegistryError::Rejected {
                name: name.to_string(),
                reason: "duplicate tag".into(),
            });
        }
        self.bindings.push((name.to_string(), definition));
        Ok(())
    }

    fn apply_style(&mut self, name: &str, css: &str) {
        self.styles.push((name.to_string(), css.to_string()));
    }
}

/// Table with one component per name under `/c`.
pub(crate) fn component_table(names: &[&str]) -> ModuleTable {
    let mut table = ModuleTable::new();
    for name in names {
        table.insert_default(format!("/c/{}.js", name), json!({"template": format!("<{}/>", name)}));
    }
    table
}

pub(crate) fn config(cache: bool, environment: Environment) -> LoaderConfig {
    LoaderConfig {
        base_path: "/c".into(),
        cache,
        environment: Some(environment),
        ..Default::default()
    }
}

pub(crate) fn frontend<S: ModuleSource + 'static>(config: LoaderConfig, source: Arc<S>) -> Frontend {
    Frontend::new(config, source).expect("valid config")
}
