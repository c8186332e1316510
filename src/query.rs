//! Keyed queries and one-shot mutations driven from the UI tick.
//!
//! Background work runs on tokio tasks; results come back over channels that
//! the app drains with `poll()` once per frame, so rendering never waits on
//! the network.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;

/// Observable state of a query or mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Loading,
    Error(String),
    Success(T),
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            RequestState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, String>> for RequestState<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(data) => RequestState::Success(data),
            Err(message) => RequestState::Error(message),
        }
    }
}

type Outcome<T> = Option<Result<T, String>>;

enum Slot<T> {
    /// A request is running; late callers subscribe instead of issuing another.
    InFlight(watch::Receiver<Outcome<T>>),
    Ready(T),
}

/// Shared map from query key to in-flight request or cached result.
///
/// The lock is only held for map bookkeeping, never across an await.
pub struct QueryCache<K, T> {
    slots: Arc<Mutex<HashMap<K, Slot<T>>>>,
}

impl<K, T> Clone for QueryCache<K, T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K, T> Default for QueryCache<K, T> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

enum Plan<T> {
    Hit(T),
    Join(watch::Receiver<Outcome<T>>),
    Lead(watch::Sender<Outcome<T>>, watch::Receiver<Outcome<T>>),
}

impl<K, T> QueryCache<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached result for `key`, if one has completed.
    pub fn get(&self, key: &K) -> Option<T> {
        match self.lock().get(key) {
            Some(Slot::Ready(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        matches!(self.lock().get(key), Some(Slot::InFlight(rx)) if rx.has_changed().is_ok())
    }

    /// Resolve `key`, running `fetcher` only when nothing is cached or in flight.
    ///
    /// Successful results are cached until invalidated. Errors are handed to
    /// every waiter but not cached, so the next call retries.
    pub async fn fetch<F, Fut>(&self, key: K, fetcher: F) -> Result<T, String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let plan = {
            let mut slots = self.lock();
            match slots.get(&key) {
                Some(Slot::Ready(data)) => Plan::Hit(data.clone()),
                // A dropped sender means the leader was cancelled; take over.
                Some(Slot::InFlight(rx)) if rx.has_changed().is_ok() => Plan::Join(rx.clone()),
                _ => {
                    let (tx, rx) = watch::channel(None);
                    slots.insert(key.clone(), Slot::InFlight(rx.clone()));
                    Plan::Lead(tx, rx)
                }
            }
        };

        match plan {
            Plan::Hit(data) => Ok(data),
            Plan::Join(mut rx) => match rx.wait_for(Option::is_some).await {
                Ok(outcome) => outcome
                    .clone()
                    .unwrap_or_else(|| Err("request produced no result".to_string())),
                Err(_) => Err("request was cancelled".to_string()),
            },
            Plan::Lead(tx, own) => {
                let result = fetcher().await;
                {
                    let mut slots = self.lock();
                    // Only settle the slot we created; it may have been
                    // invalidated (and possibly re-issued) meanwhile.
                    let ours = matches!(
                        slots.get(&key),
                        Some(Slot::InFlight(rx)) if rx.same_channel(&own)
                    );
                    if ours {
                        match &result {
                            Ok(data) => {
                                slots.insert(key, Slot::Ready(data.clone()));
                            }
                            Err(_) => {
                                slots.remove(&key);
                            }
                        }
                    }
                }
                tx.send_replace(Some(result.clone()));
                result
            }
        }
    }

    pub fn invalidate(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    /// Drop cached results whose key fails `keep`. In-flight requests stay
    /// so their waiters still share one fetch.
    pub fn retain(&self, mut keep: impl FnMut(&K) -> bool) {
        self.lock()
            .retain(|key, slot| matches!(slot, Slot::InFlight(_)) || keep(key));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// A query bound to one "current" key, as displayed by a single view.
///
/// Results for any other key are dropped on arrival, so switching keys while
/// a request is outstanding never shows the superseded data.
pub struct Query<K, T> {
    cache: QueryCache<K, T>,
    key: Option<K>,
    state: RequestState<T>,
    sender: mpsc::UnboundedSender<(K, Result<T, String>)>,
    receiver: mpsc::UnboundedReceiver<(K, Result<T, String>)>,
}

impl<K, T> Query<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cache: QueryCache<K, T>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            cache,
            key: None,
            state: RequestState::Idle,
            sender,
            receiver,
        }
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    pub fn cache(&self) -> &QueryCache<K, T> {
        &self.cache
    }

    /// Point the query at `key`.
    ///
    /// A cached result is shown immediately; otherwise the query goes to
    /// `Loading` and `fetcher` runs in the background (or joins an identical
    /// request already in flight).
    pub fn set<F, Fut>(&mut self, key: K, fetcher: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, String>> + Send + 'static,
    {
        if let Some(data) = self.cache.get(&key) {
            self.key = Some(key);
            self.state = RequestState::Success(data);
            return;
        }

        self.key = Some(key.clone());
        self.state = RequestState::Loading;

        let cache = self.cache.clone();
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let result = cache.fetch(key.clone(), fetcher).await;
            let _ = sender.send((key, result));
        });
    }

    /// Drop the cached entry for the current key and fetch it again.
    pub fn refetch<F, Fut>(&mut self, fetcher: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, String>> + Send + 'static,
    {
        let Some(key) = self.key.clone() else {
            return;
        };
        self.cache.invalidate(&key);
        self.set(key, fetcher);
    }

    /// Apply finished results. Returns `true` when the visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok((key, result)) => {
                    if self.key.as_ref() == Some(&key) {
                        self.state = result.into();
                        changed = true;
                    } else {
                        tracing::debug!("discarding result for superseded query key");
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Forget the current key and its state; the cache is left untouched.
    pub fn clear(&mut self) {
        self.key = None;
        self.state = RequestState::Idle;
    }
}

/// Explicitly triggered, uncached request (analyze, document, delete).
pub struct Mutation<T> {
    state: RequestState<T>,
    receiver: Option<oneshot::Receiver<Result<T, String>>>,
    abort_handle: Option<AbortHandle>,
}

impl<T> Default for Mutation<T> {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
            receiver: None,
            abort_handle: None,
        }
    }
}

impl<T: Send + 'static> Mutation<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_loading()
    }

    /// Start `request`. A request still pending from an earlier call is
    /// abandoned and its result never observed.
    pub fn mutate<Fut>(&mut self, request: Fut)
    where
        Fut: Future<Output = Result<T, String>> + Send + 'static,
    {
        self.abandon();
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let _ = tx.send(request.await);
        });
        self.abort_handle = Some(handle.abort_handle());
        self.receiver = Some(rx);
        self.state = RequestState::Loading;
    }

    /// Record a failure without issuing a request (local validation).
    pub fn fail(&mut self, message: impl Into<String>) {
        self.abandon();
        self.state = RequestState::Error(message.into());
    }

    /// Apply the result if it has arrived, calling `on_success` with the new
    /// data. Returns `true` when the mutation settled on this call.
    pub fn poll(&mut self, on_success: impl FnOnce(&T)) -> bool {
        let Some(ref mut rx) = self.receiver else {
            return false;
        };

        match rx.try_recv() {
            Ok(result) => {
                self.receiver = None;
                self.abort_handle = None;
                self.state = result.into();
                if let RequestState::Success(ref data) = self.state {
                    on_success(data);
                }
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.receiver = None;
                self.abort_handle = None;
                self.state = RequestState::Error("request was cancelled".to_string());
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.abandon();
        self.state = RequestState::Idle;
    }

    fn abandon(&mut self) {
        self.receiver = None;
        if let Some(handle) = self.abort_handle.take() {
            handle.abort();
        }
    }
}
