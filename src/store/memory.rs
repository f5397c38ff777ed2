//! In-process document store.
//!
//! Complete implementation of [`DocumentStore`] used by tests and local
//! tooling. Mutations take the store lock, update the collection map, then
//! fan out full snapshots to subscribers *after* releasing the lock, so
//! callbacks are free to re-enter the store.
//!
//! An offline toggle makes every read/write/delete fail with
//! [`StoreError::Unavailable`], exercising the connectivity-error path.

use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{
    CollectionCallback, CollectionSnapshot, Document, DocumentCallback, DocumentStore, StoreError,
    SubscriptionId, Timestamp,
};

type CollectionFn = dyn Fn(&CollectionSnapshot) + Send + Sync;
type DocumentFn = dyn Fn(Option<&Document>) + Send + Sync;

enum Subscriber {
    Collection {
        collection: String,
        callback: Arc<CollectionFn>,
    },
    Document {
        collection: String,
        id: String,
        callback: Arc<DocumentFn>,
    },
}

#[derive(Default)]
struct Inner {
    collections: FxHashMap<String, CollectionSnapshot>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    clock: u64,
    offline: bool,
}

impl Inner {
    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn snapshot(&self, collection: &str) -> CollectionSnapshot {
        self.collections.get(collection).cloned().unwrap_or_default()
    }
}

/// Pending notifications, invoked after the store lock is released.
struct FanOut {
    snapshot: CollectionSnapshot,
    document: Option<Document>,
    collection_callbacks: Vec<Arc<CollectionFn>>,
    document_callbacks: Vec<Arc<DocumentFn>>,
}

impl FanOut {
    fn dispatch(self) {
        for callback in &self.collection_callbacks {
            callback(&self.snapshot);
        }
        for callback in &self.document_callbacks {
            callback(self.document.as_ref());
        }
    }
}

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store behind an `Arc`, ready to share with sessions.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Toggle simulated connectivity loss.
    ///
    /// While offline, every read/write/delete fails with
    /// [`StoreError::Unavailable`]. Existing subscriptions stay registered.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Recover rather than propagate poisoning: the map is always left
        // in a consistent state between mutations.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Collect the fan-out for a change to `collection`/`id`.
    ///
    /// Must be called with the lock held; the returned value is dispatched
    /// after the guard is dropped.
    fn fan_out(inner: &Inner, collection: &str, id: &str) -> FanOut {
        let snapshot = inner.snapshot(collection);
        let document = snapshot.get(id).cloned();

        let mut collection_callbacks = Vec::new();
        let mut document_callbacks = Vec::new();
        for (_, subscriber) in &inner.subscribers {
            match subscriber {
                Subscriber::Collection { collection: c, callback } if c == collection => {
                    collection_callbacks.push(Arc::clone(callback));
                }
                Subscriber::Document { collection: c, id: i, callback }
                    if c == collection && i == id =>
                {
                    document_callbacks.push(Arc::clone(callback));
                }
                _ => {}
            }
        }

        FanOut {
            snapshot,
            document,
            collection_callbacks,
            document_callbacks,
        }
    }
}

/// Shallow top-level merge: incoming object fields overwrite existing ones.
/// Anything other than object-into-object degenerates to a replace.
fn shallow_merge(existing: Option<Document>, incoming: Document) -> Document {
    match (existing, incoming) {
        (Some(serde_json::Value::Object(mut base)), serde_json::Value::Object(fields)) => {
            for (key, value) in fields {
                base.insert(key, value);
            }
            serde_json::Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.lock();
        inner.check_online()?;
        Ok(inner.snapshot(collection).get(id).cloned())
    }

    fn get_all(&self, collection: &str) -> Result<CollectionSnapshot, StoreError> {
        let inner = self.lock();
        inner.check_online()?;
        Ok(inner.snapshot(collection))
    }

    fn put(
        &self,
        collection: &str,
        id: &str,
        document: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        let fan_out = {
            let mut inner = self.lock();
            inner.check_online()?;
            let map = inner.collections.entry(collection.to_string()).or_default();
            let stored = if merge {
                shallow_merge(map.get(id).cloned(), document)
            } else {
                document
            };
            map.insert(id.to_string(), stored);
            Self::fan_out(&inner, collection, id)
        };
        fan_out.dispatch();
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let fan_out = {
            let mut inner = self.lock();
            inner.check_online()?;
            let existed = inner
                .collections
                .get_mut(collection)
                .and_then(|map| map.remove(id))
                .is_some();
            if !existed {
                debug!(collection, id, "delete of absent document");
            }
            Self::fan_out(&inner, collection, id)
        };
        fan_out.dispatch();
        Ok(())
    }

    fn subscribe_collection(
        &self,
        collection: &str,
        callback: CollectionCallback,
    ) -> SubscriptionId {
        let callback: Arc<CollectionFn> = Arc::from(callback);
        let (id, snapshot) = {
            let mut inner = self.lock();
            let id = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;
            inner.subscribers.push((
                id,
                Subscriber::Collection {
                    collection: collection.to_string(),
                    callback: Arc::clone(&callback),
                },
            ));
            (id, inner.snapshot(collection))
        };
        // Initial delivery with the current state.
        callback(&snapshot);
        id
    }

    fn subscribe_document(
        &self,
        collection: &str,
        id: &str,
        callback: DocumentCallback,
    ) -> SubscriptionId {
        let callback: Arc<DocumentFn> = Arc::from(callback);
        let (subscription, document) = {
            let mut inner = self.lock();
            let subscription = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;
            inner.subscribers.push((
                subscription,
                Subscriber::Document {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    callback: Arc::clone(&callback),
                },
            ));
            (subscription, inner.snapshot(collection).get(id).cloned())
        };
        callback(document.as_ref());
        subscription
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.lock().subscribers.retain(|(id, _)| *id != subscription);
    }

    fn server_timestamp(&self) -> Timestamp {
        let mut inner = self.lock();
        inner.clock += 1;
        Timestamp(inner.clock)
    }
}
