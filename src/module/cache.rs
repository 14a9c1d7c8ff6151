//! Single-flight module cache.
//!
//! Two maps guarded by one lock:
//! - `completed`: settled successes, handed out as shared `Arc`s
//! - `in_flight`: one watch channel per name whose load has not settled
//!
//! A name is never in both maps at once. Loads run as spawned tasks, so a load
//! that has started always runs to completion even if nobody is waiting on it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use crate::module::loader::LoadError;

/// Result delivered to everyone waiting on a load.
pub type Outcome<V> = Result<Arc<V>, LoadError>;

type Settlement<V> = watch::Receiver<Option<Outcome<V>>>;

struct CacheState<V> {
    completed: HashMap<String, Arc<V>>,
    in_flight: HashMap<String, Settlement<V>>,
}

/// Names held by a cache at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
    pub cached: Vec<String>,
    pub loading: Vec<String>,
}

/// Handle on a load that was started or joined by [`DedupCache::begin`].
pub enum Pending<V> {
    /// Served from the completed map without any I/O
    Ready(Outcome<V>),
    /// Waiting on a shared in-flight load
    InFlight {
        name: String,
        receiver: Settlement<V>,
    },
}

impl<V> Pending<V> {
    /// Wait for the load to settle.
    pub async fn wait(self) -> Outcome<V> {
        match self {
            Pending::Ready(outcome) => outcome,
            Pending::InFlight { name, mut receiver } => {
                let settled = match receiver.wait_for(Option::is_some).await {
                    Ok(settled) => (*settled).clone(),
                    Err(_) => None,
                };
                settled.unwrap_or(Err(LoadError::Interrupted { name }))
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Pending::Ready(_))
    }
}

/// Cache that allows at most one concurrent load per name.
///
/// Failures are never cached: the in-flight marker is cleared and every waiter
/// receives the same error, leaving the name free for a fresh attempt.
pub struct DedupCache<V> {
    state: Arc<Mutex<CacheState<V>>>,
    caching: bool,
}

impl<V> DedupCache<V>
where
    V: Send + Sync + 'static,
{
    /// Create a cache. With `caching` off, completed loads are not kept but
    /// concurrent requests still share one load.
    pub fn new(caching: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                completed: HashMap::new(),
                in_flight: HashMap::new(),
            })),
            caching,
        }
    }

    pub fn caching(&self) -> bool {
        self.caching
    }

    /// Probe the completed map without loading.
    pub fn get(&self, name: &str) -> Option<Arc<V>> {
        self.lock().completed.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().completed.contains_key(name)
    }

    pub fn is_loading(&self, name: &str) -> bool {
        self.lock().in_flight.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock().completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `name`, joining or starting a load as needed.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn get_or_load<F, Fut>(&self, name: &str, loader: F) -> Outcome<V>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<V, LoadError>> + Send + 'static,
    {
        self.begin(name, loader).wait().await
    }

    /// Start or join a load without waiting for it.
    ///
    /// The check-and-insert happens under the lock, so two callers can never both
    /// start a load for the same name. `loader` is only invoked when a new load is
    /// actually started.
    pub fn begin<F, Fut>(&self, name: &str, loader: F) -> Pending<V>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<V, LoadError>> + Send + 'static,
    {
        let sender = {
            let mut state = self.lock();

            if self.caching {
                if let Some(value) = state.completed.get(name) {
                    return Pending::Ready(Ok(Arc::clone(value)));
                }
            }

            if let Some(receiver) = state.in_flight.get(name) {
                log::debug!("Joining in-flight load of '{}'", name);
                return Pending::InFlight {
                    name: name.to_string(),
                    receiver: receiver.clone(),
                };
            }

            let (sender, receiver) = watch::channel(None);
            state.in_flight.insert(name.to_string(), receiver);
            sender
        };

        log::debug!("Cache miss for '{}', starting load", name);

        let receiver = sender.subscribe();
        let settle = Settle {
            state: Arc::clone(&self.state),
            name: name.to_string(),
            caching: self.caching,
            sender: Some(sender),
        };

        let future = loader(name.to_string());
        tokio::spawn(async move {
            let outcome = future.await.map(Arc::new);
            settle.finish(outcome);
        });

        Pending::InFlight {
            name: name.to_string(),
            receiver,
        }
    }

    /// Drop one completed entry, or all of them.
    ///
    /// In-flight loads are left alone and will still populate the cache when they
    /// settle. Returns the number of entries removed.
    pub fn clear(&self, name: Option<&str>) -> usize {
        let mut state = self.lock();
        match name {
            Some(name) => usize::from(state.completed.remove(name).is_some()),
            None => {
                let removed = state.completed.len();
                state.completed.clear();
                removed
            }
        }
    }

    /// Cached and in-flight names, each sorted.
    pub fn snapshot(&self) -> CacheSnapshot {
        let state = self.lock();
        let mut cached: Vec<String> = state.completed.keys().cloned().collect();
        let mut loading: Vec<String> = state.in_flight.keys().cloned().collect();
        cached.sort();
        loading.sort();
        CacheSnapshot { cached, loading }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        lock_state(&self.state)
    }
}

impl<V> std::fmt::Debug for DedupCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock_state(&self.state);
        f.debug_struct("DedupCache")
            .field("caching", &self.caching)
            .field("completed", &state.completed.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

fn lock_state<V>(state: &Mutex<CacheState<V>>) -> MutexGuard<'_, CacheState<V>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Settles one in-flight load exactly once.
///
/// If dropped before `finish` (the load panicked), the marker is still cleared and
/// waiters are told the load was interrupted.
struct Settle<V> {
    state: Arc<Mutex<CacheState<V>>>,
    name: String,
    caching: bool,
    sender: Option<watch::Sender<Option<Outcome<V>>>>,
}

impl<V> Settle<V> {
    fn finish(mut self, outcome: Outcome<V>) {
        self.settle(outcome);
    }

    fn settle(&mut self, outcome: Outcome<V>) {
        let Some(sender) = self.sender.take() else {
            return;
        };

        // Publish while holding the lock so no caller sees the marker gone
        // without the result being visible.
        let mut state = lock_state(&self.state);
        state.in_flight.remove(&self.name);

        match &outcome {
            Ok(value) if self.caching => {
                state.completed.insert(self.name.clone(), Arc::clone(value));
            }
            Ok(_) => {}
            Err(e) => log::warn!("Load of '{}' failed: {}", self.name, e),
        }

        sender.send_replace(Some(outcome));
    }
}

impl<V> Drop for Settle<V> {
    fn drop(&mut self) {
        if self.sender.is_some() {
            let name = self.name.clone();
            self.settle(Err(LoadError::Interrupted { name }));
        }
    }
}
