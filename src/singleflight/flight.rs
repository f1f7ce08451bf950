//! In-flight call deduplication.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinError;

type Waiters<T> = Vec<oneshot::Sender<T>>;
type Calls<T> = Arc<Mutex<HashMap<String, Waiters<T>>>>;

// == Single Flight ==
/// Ensures at most one call per key is in flight.
///
/// The first caller for a key becomes the leader. Its producer runs on a
/// spawned task, so the call keeps going and stays registered even if the
/// leader itself is dropped. Callers arriving while it runs park on a
/// oneshot channel and receive a clone of the result. Once the result is
/// delivered the key is forgotten, so the next call starts a fresh load.
pub struct SingleFlight<T> {
    calls: Calls<T>,
}

impl<T: Clone + Send + 'static> SingleFlight<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Work ==
    /// Runs `producer` unless a call for `key` is already in flight, in
    /// which case the result of that call is returned instead.
    ///
    /// Only the leader can see an error: it is returned when the producer
    /// task panicked. The key is then released and waiting callers retry,
    /// one of them becoming the new leader.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn work<F, Fut>(&self, key: &str, producer: F) -> Result<T, JoinError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        loop {
            let waiter = {
                let mut calls = self.calls.lock();
                match calls.entry(key.to_string()) {
                    Entry::Occupied(mut waiters) => {
                        let (tx, rx) = oneshot::channel();
                        waiters.get_mut().push(tx);
                        rx
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(Vec::new());
                        break;
                    }
                }
            };

            if let Ok(value) = waiter.await {
                return Ok(value);
            }
        }

        let flight = Flight {
            calls: self.calls.clone(),
            key: key.to_string(),
            armed: true,
        };
        let call = producer();

        tokio::spawn(async move {
            let mut flight = flight;
            let value = call.await;
            flight.complete(&value);
            value
        })
        .await
    }

    /// Returns the number of keys currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone + Send + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}

// == Flight ==
/// Producer-side handle on an in-flight key.
///
/// Dropping it without completing (the producer panicked) deregisters the
/// key, which closes every waiter's channel.
struct Flight<T> {
    calls: Calls<T>,
    key: String,
    armed: bool,
}

impl<T: Clone> Flight<T> {
    fn complete(&mut self, value: &T) {
        self.armed = false;
        let waiters = self.calls.lock().remove(&self.key).unwrap_or_default();
        for tx in waiters {
            // A waiter that went away no longer needs the value.
            let _ = tx.send(value.clone());
        }
    }
}

impl<T> Drop for Flight<T> {
    fn drop(&mut self) {
        if self.armed {
            self.calls.lock().remove(&self.key);
        }
    }
}
