//! Request coalescing keyed like the cache.
//!
//! The first caller for a key starts the work; callers arriving while it is in
//! flight await the same shared future instead of starting their own.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// In-flight work registry.
///
/// `T` must be `Clone` because every waiter receives its own copy of the result.
pub struct SingleFlight<T: Clone + Send + Sync + 'static> {
    in_flight: Arc<DashMap<String, Shared<BoxFuture<'static, T>>>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(DashMap::new()),
        }
    }
}

/// Result of a coalesced call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flight<T> {
    pub value: T,
    /// True for the caller that started the work.
    pub leader: bool,
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `key`, or join the run already in flight.
    ///
    /// `work` is only invoked by the leader.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Flight<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (shared, leader) = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let shared = work().boxed().shared();
                entry.insert(shared.clone());
                (shared, true)
            }
        };

        if !leader {
            tracing::debug!(key, "Joined in-flight request");
        }

        let value = shared.clone().await;

        // Whoever finishes first retires the entry; a newer run under the
        // same key is left alone.
        self.in_flight
            .remove_if(key, |_, current| current.ptr_eq(&shared));

        Flight { value, leader }
    }

    /// Number of keys with work in flight.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Forget every in-flight entry. Futures already awaited keep running.
    pub fn clear(&self) {
        self.in_flight.clear();
    }
}
