//! Binding loaded modules into the live component registry.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::module::loader::ModuleRecord;

/// Errors raised when the rendering registry cannot take a binding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry has no usable `component` capability (e.g. it was unmounted)
    #[error("Registry cannot accept component '{0}': component binding unavailable")]
    Unavailable(String),

    #[error("Registry rejected component '{name}': {reason}")]
    Rejected { name: String, reason: String },
}

/// The rendering layer's table of renderable components.
///
/// `component` is the only capability the binder needs; style application is
/// optional and ignored by default.
pub trait ComponentRegistry {
    fn component(&mut self, name: &str, definition: Arc<ModuleRecord>) -> Result<(), RegistryError>;

    fn apply_style(&mut self, _name: &str, _css: &str) {}
}

#[derive(Default)]
struct BinderState {
    registered: HashSet<String>,
    styled: HashSet<String>,
}

/// Tracks which logical names are bound into the registry.
///
/// The registered set only grows; `clear` is the explicit reset.
#[derive(Default)]
pub struct RegistryBinder {
    state: Mutex<BinderState>,
}

impl RegistryBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `record` under `name`.
    ///
    /// Safe to repeat: the registry is handed the record again and the name stays in
    /// the set once. The style payload is applied on the first binding only.
    pub fn register<R>(&self, registry: &mut R, name: &str, record: Arc<ModuleRecord>) -> Result<(), RegistryError>
    where
        R: ComponentRegistry + ?Sized,
    {
        let style = record.style.clone();
        registry.component(name, record)?;

        // The registry may call back into the binder, so release the lock before
        // handing it the style.
        let pending_style = {
            let mut state = self.lock();
            if state.registered.insert(name.to_string()) {
                log::debug!("Registered component '{}'", name);
            }
            style.filter(|_| state.styled.insert(name.to_string()))
        };

        if let Some(css) = pending_style {
            registry.apply_style(name, &css);
        }
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().registered.contains(name)
    }

    /// Registered names, sorted.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().registered.iter().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget one name or all of them.
    pub fn clear(&self, name: Option<&str>) {
        let mut state = self.lock();
        match name {
            Some(name) => {
                state.registered.remove(name);
                state.styled.remove(name);
            }
            None => {
                state.registered.clear();
                state.styled.clear();
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BinderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RegistryBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBinder")
            .field("registered", &self.registered_names())
            .finish()
    }
}
