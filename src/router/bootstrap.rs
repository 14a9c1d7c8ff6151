//! Router class bootstrap with production-to-development fallback.
//!
//! Provides a state machine for the bootstrap:
//! UNLOADED -> LOADING -> LOADED
//! UNLOADED -> LOADING -> FALLBACK_LOADING -> LOADED | FAILED
//! UNLOADED -> LOADING -> FAILED

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::module::cache::DedupCache;
use crate::module::loader::{LoadError, ModuleLoader, ModuleRecord};

const ROUTER_KEY: &str = "router";

/// Router bootstrap state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootstrapState {
    /// Nobody has asked for the router yet
    Unloaded,
    /// Fetching the build for the configured environment
    Loading,
    /// Production build was missing; fetching the development build
    FallbackLoading,
    /// Router class is memoized
    Loaded,
    /// Last attempt failed
    Failed,
}

impl std::fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "UNLOADED"),
            Self::Loading => write!(f, "LOADING"),
            Self::FallbackLoading => write!(f, "FALLBACK_LOADING"),
            Self::Loaded => write!(f, "LOADED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Loads the router class once and memoizes it.
///
/// Concurrent callers share one attempt. In production, a missing primary build
/// triggers exactly one retry against the development build; any other failure is
/// returned as is. A failed attempt is not memoized, so a later call starts over.
pub struct RouterBootstrap {
    loader: ModuleLoader,
    state: Arc<Mutex<BootstrapState>>,
    cache: DedupCache<ModuleRecord>,
}

impl RouterBootstrap {
    pub fn new(loader: ModuleLoader) -> Self {
        Self {
            loader,
            state: Arc::new(Mutex::new(BootstrapState::Unloaded)),
            cache: DedupCache::new(true),
        }
    }

    pub fn state(&self) -> BootstrapState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The memoized router class, if loaded.
    pub fn loaded(&self) -> Option<Arc<ModuleRecord>> {
        self.cache.get(ROUTER_KEY)
    }

    /// Load the router class, or return the memoized one without I/O.
    pub async fn load(&self) -> Result<Arc<ModuleRecord>, LoadError> {
        let loader = self.loader.clone();
        let state = Arc::clone(&self.state);

        self.cache
            .get_or_load(ROUTER_KEY, move |name| {
                transition(&state, BootstrapState::Loading);
                attempt(loader, state, name)
            })
            .await
    }
}

impl std::fmt::Debug for RouterBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterBootstrap")
            .field("environment", &self.loader.environment())
            .field("state", &self.state())
            .finish()
    }
}

async fn attempt(
    loader: ModuleLoader,
    state: Arc<Mutex<BootstrapState>>,
    name: String,
) -> Result<ModuleRecord, LoadError> {
    let env = loader.environment();
    let primary = loader.resolver().router_path(env);

    let err = match loader.load_path(&name, primary).await {
        Ok(record) => {
            transition(&state, BootstrapState::Loaded);
            return Ok(record);
        }
        Err(e) => e,
    };

    if !(env.is_production() && err.is_not_found()) {
        transition(&state, BootstrapState::Failed);
        return Err(err);
    }

    log::warn!("{}; falling back to the development router build", err);
    transition(&state, BootstrapState::FallbackLoading);

    let secondary = loader.resolver().router_path(Environment::Development);
    match loader.load_path(&name, secondary).await {
        Ok(record) => {
            transition(&state, BootstrapState::Loaded);
            Ok(record)
        }
        Err(e) => {
            transition(&state, BootstrapState::Failed);
            Err(e)
        }
    }
}

fn transition(state: &Mutex<BootstrapState>, next: BootstrapState) {
    let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
    log::debug!("Router bootstrap {} -> {}", *current, next);
    *current = next;
}
