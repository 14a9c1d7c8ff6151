//! High-level loader API for the front end.
//!
//! `Frontend` is constructed explicitly and passed by reference; every instance
//! owns its own caches, so independent instances never share state.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{Environment, LoaderConfig};
use crate::error::{Error, Result};
use crate::fetch::ModuleSource;
use crate::module::cache::{DedupCache, Outcome, Pending};
use crate::module::loader::{LoadError, ModuleLoader, ModuleRecord};
use crate::module::registry::{ComponentRegistry, RegistryBinder, RegistryError};
use crate::module::resolver::{ModuleResolver, Namespace};
use crate::router::bootstrap::{BootstrapState, RouterBootstrap};
use crate::router::hash::{parse_hash, RouteRequest};

/// Diagnostic snapshot returned by [`Frontend::info`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderInfo {
    pub cached_components: Vec<String>,
    pub registered_components: Vec<String>,
    pub loading_components: Vec<String>,
    pub cache_size: usize,
}

/// One item that failed inside a batch operation.
#[derive(Debug)]
pub struct BatchFailure {
    pub name: String,
    pub error: Error,
}

/// Result of a batch operation; failures never abort the batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successful: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.name.as_str()).collect()
    }

    fn fail(&mut self, name: &str, error: impl Into<Error>) {
        let error = error.into();
        log::warn!("'{}' failed: {}", name, error);
        self.failed.push(BatchFailure {
            name: name.to_string(),
            error,
        });
    }
}

/// Component and route loader for one front end.
pub struct Frontend {
    config: LoaderConfig,
    loader: ModuleLoader,
    components: DedupCache<ModuleRecord>,
    routes: DedupCache<ModuleRecord>,
    binder: RegistryBinder,
    router: RouterBootstrap,
}

impl Frontend {
    /// Build a front end loader over `source`.
    ///
    /// The environment is resolved here, once, and fixed for the instance.
    pub fn new(config: LoaderConfig, source: Arc<dyn ModuleSource>) -> Result<Self> {
        let environment = config.resolve_environment()?;
        let resolver = Arc::new(ModuleResolver::new(&config));
        let loader = ModuleLoader::new(resolver, source, environment);

        log::info!(
            "Front end loader ready ({}, caching {})",
            environment,
            if config.cache { "on" } else { "off" }
        );

        Ok(Self {
            components: DedupCache::new(config.cache),
            routes: DedupCache::new(config.cache),
            binder: RegistryBinder::new(),
            router: RouterBootstrap::new(loader.clone()),
            loader,
            config,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.loader.environment()
    }

    /// Cached component, without loading.
    pub fn cached_component(&self, name: &str) -> Option<Arc<ModuleRecord>> {
        self.components.get(name)
    }

    pub async fn load_component(&self, name: &str) -> Outcome<ModuleRecord> {
        self.begin(Namespace::Component, name).wait().await
    }

    pub async fn load_route(&self, name: &str) -> Outcome<ModuleRecord> {
        self.begin(Namespace::Route, name).wait().await
    }

    /// Parse a location hash into a route request.
    pub fn route_for_hash(&self, hash: &str) -> RouteRequest {
        parse_hash(hash, &self.config.default_route)
    }

    /// Parse a location hash and load the route it names.
    pub async fn load_route_for_hash(&self, hash: &str) -> Result<(RouteRequest, Arc<ModuleRecord>)> {
        let request = self.route_for_hash(hash);
        let record = self.load_route(&request.name).await?;
        Ok((request, record))
    }

    /// Bind an already loaded record.
    pub fn register<R>(&self, registry: &mut R, name: &str, record: Arc<ModuleRecord>) -> std::result::Result<(), RegistryError>
    where
        R: ComponentRegistry + ?Sized,
    {
        self.binder.register(registry, name, record)
    }

    /// Load every name (concurrently) and register the ones that load.
    pub async fn register_many<R, S>(&self, registry: &mut R, names: &[S]) -> BatchOutcome
    where
        R: ComponentRegistry + ?Sized,
        S: AsRef<str>,
    {
        let pending: Vec<_> = names
            .iter()
            .map(|name| (name.as_ref(), self.begin(Namespace::Component, name.as_ref())))
            .collect();

        let mut outcome = BatchOutcome::default();
        for (name, load) in pending {
            let bound = match load.wait().await {
                Ok(record) => self.binder.register(registry, name, record).map_err(Error::from),
                Err(e) => Err(Error::from(e)),
            };

            match bound {
                Ok(()) => outcome.successful.push(name.to_string()),
                Err(e) => outcome.fail(name, e),
            }
        }
        outcome
    }

    /// Register the configured global components.
    pub async fn register_globals<R>(&self, registry: &mut R) -> BatchOutcome
    where
        R: ComponentRegistry + ?Sized,
    {
        let names = self.config.global_components.clone();
        self.register_many(registry, &names).await
    }

    /// Warm the component cache without registering anything.
    pub async fn preload<S: AsRef<str>>(&self, names: &[S]) -> BatchOutcome {
        self.preload_in(Namespace::Component, names).await
    }

    /// Warm the route cache ahead of navigation.
    pub async fn preload_routes<S: AsRef<str>>(&self, names: &[S]) -> BatchOutcome {
        self.preload_in(Namespace::Route, names).await
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.binder.is_registered(name)
    }

    /// Drop cached components and their registration state, for one name or all.
    ///
    /// A load already in flight for a cleared name is not cancelled and will still
    /// repopulate the cache when it settles.
    pub fn clear_cache(&self, name: Option<&str>) {
        let removed = self.components.clear(name);
        self.binder.clear(name);
        log::debug!("Cleared {} cached component(s)", removed);
    }

    /// Drop cached routes, for one name or all.
    pub fn clear_routes(&self, name: Option<&str>) {
        self.routes.clear(name);
    }

    pub fn info(&self) -> LoaderInfo {
        let snapshot = self.components.snapshot();
        LoaderInfo {
            cache_size: snapshot.cached.len(),
            cached_components: snapshot.cached,
            registered_components: self.binder.registered_names(),
            loading_components: snapshot.loading,
        }
    }

    /// Load (or return the memoized) router class.
    pub async fn router_class(&self) -> Outcome<ModuleRecord> {
        self.router.load().await
    }

    pub fn router_state(&self) -> BootstrapState {
        self.router.state()
    }

    async fn preload_in<S: AsRef<str>>(&self, namespace: Namespace, names: &[S]) -> BatchOutcome {
        let pending: Vec<_> = names
            .iter()
            .map(|name| (name.as_ref(), self.begin(namespace, name.as_ref())))
            .collect();

        let mut outcome = BatchOutcome::default();
        for (name, load) in pending {
            match load.wait().await {
                Ok(_) => outcome.successful.push(name.to_string()),
                Err(e) => outcome.fail(name, e),
            }
        }
        outcome
    }

    fn begin(&self, namespace: Namespace, name: &str) -> Pending<ModuleRecord> {
        if name.trim().is_empty() {
            return Pending::Ready(Err(LoadError::EmptyName));
        }

        let cache = match namespace {
            Namespace::Component => &self.components,
            Namespace::Route => &self.routes,
        };

        let loader = self.loader.clone();
        cache.begin(name, move |name| async move { loader.load(namespace, &name).await })
    }
}

impl std::fmt::Debug for Frontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontend")
            .field("environment", &self.environment())
            .field("components", &self.components)
            .field("routes", &self.routes)
            .field("binder", &self.binder)
            .field("router", &self.router)
            .finish()
    }
}
